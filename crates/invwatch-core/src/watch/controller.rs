//! Watch lifecycle and per-event dispatch.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use super::stabilize::{policy_from_config, StabilizationPolicy};
use super::{classify, EventDecision, IgnoreReason, InvoiceEvent};
use crate::error::{Result, WatchError};
use crate::models::config::{WatchAppConfig, WatchConfig};
use crate::models::record::InvoiceRecord;
use crate::pipeline::InvoicePipeline;

/// What happened to one path in a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Filtered out before any processing.
    Ignored { path: PathBuf, reason: IgnoreReason },
    /// Processed and appended to the ledger.
    Recorded(InvoiceRecord),
    /// Processing failed; the watcher carries on.
    Failed { path: PathBuf, error: String },
}

/// Filters events and runs accepted files through the pipeline.
pub struct InvoiceDispatcher {
    config: WatchConfig,
    stabilization: Box<dyn StabilizationPolicy>,
    pipeline: InvoicePipeline,
}

impl InvoiceDispatcher {
    /// Dispatcher using the stabilization policy from `config`.
    pub fn new(config: WatchConfig, pipeline: InvoicePipeline) -> Self {
        let stabilization = policy_from_config(&config.stabilization);
        Self::with_policy(config, stabilization, pipeline)
    }

    /// Dispatcher with an explicit stabilization policy.
    pub fn with_policy(
        config: WatchConfig,
        stabilization: Box<dyn StabilizationPolicy>,
        pipeline: InvoicePipeline,
    ) -> Self {
        Self {
            config,
            stabilization,
            pipeline,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &InvoicePipeline {
        &self.pipeline
    }

    /// Handle every path in a notification, in order.
    pub fn dispatch(&self, event: &Event) -> Vec<DispatchOutcome> {
        InvoiceEvent::from_notify(event)
            .iter()
            .map(|e| self.dispatch_one(e))
            .collect()
    }

    /// Handle one creation event. Errors stop here and are logged.
    pub fn dispatch_one(&self, event: &InvoiceEvent) -> DispatchOutcome {
        let path = match classify(event, &self.config) {
            EventDecision::Ignore(reason) => {
                debug!("Ignoring {} ({:?})", event.path.display(), reason);
                return DispatchOutcome::Ignored {
                    path: event.path.clone(),
                    reason,
                };
            }
            EventDecision::Accept(path) => path,
        };

        info!("New invoice detected: {}", path.display());

        match self.process(&path) {
            Ok(record) => {
                info!("Invoice {} recorded", record);
                DispatchOutcome::Recorded(record)
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                DispatchOutcome::Failed {
                    path,
                    error: e.to_string(),
                }
            }
        }
    }

    fn process(&self, path: &Path) -> Result<InvoiceRecord> {
        self.stabilization.wait(path)?;
        self.pipeline.process(path)
    }
}

enum WorkerMessage {
    Event(notify::Result<Event>),
    Shutdown,
}

struct Running {
    watcher: RecommendedWatcher,
    sender: mpsc::Sender<WorkerMessage>,
    stopping: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

/// Owns the directory subscription and the worker thread that handles its
/// events. Can be stopped and started again.
pub struct InvoiceWatcher {
    dispatcher: Arc<InvoiceDispatcher>,
    running: Option<Running>,
}

impl InvoiceWatcher {
    pub fn new(dispatcher: InvoiceDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            running: None,
        }
    }

    /// Build the watcher, pipeline included, from configuration.
    pub fn from_config(config: &WatchAppConfig) -> Result<Self> {
        let pipeline = InvoicePipeline::from_config(config)?;
        Ok(Self::new(InvoiceDispatcher::new(config.watch.clone(), pipeline)))
    }

    /// Directory being watched.
    pub fn directory(&self) -> &Path {
        &self.dispatcher.config().directory
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Create the directory if needed, subscribe to it, and start the worker.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(WatchError::Lifecycle("already running"));
        }

        let directory = self.directory().to_path_buf();
        if !directory.exists() {
            std::fs::create_dir_all(&directory)?;
            info!("Created watch directory {}", directory.display());
        }

        let (sender, receiver) = mpsc::channel();
        let event_sender = sender.clone();
        let mut watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| {
                // The worker only goes away after the watcher is dropped.
                let _ = event_sender.send(WorkerMessage::Event(event));
            },
            Config::default(),
        )?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        let stopping = Arc::new(AtomicBool::new(false));
        let worker = {
            let dispatcher = Arc::clone(&self.dispatcher);
            let stopping = Arc::clone(&stopping);
            thread::Builder::new()
                .name("invwatch-worker".to_string())
                .spawn(move || run_worker(receiver, dispatcher, stopping))?
        };

        info!("Watching {} for new invoices", directory.display());

        self.running = Some(Running {
            watcher,
            sender,
            stopping,
            worker,
        });
        Ok(())
    }

    /// Release the subscription and wait for the worker. An invoice already
    /// being processed finishes; queued events are dropped.
    pub fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Err(WatchError::Lifecycle("not running"));
        };

        running.stopping.store(true, Ordering::SeqCst);
        drop(running.watcher);
        let _ = running.sender.send(WorkerMessage::Shutdown);

        if running.worker.join().is_err() {
            error!("Watch worker panicked");
        }

        info!("Stopped watching {}", self.directory().display());
        Ok(())
    }
}

impl Drop for InvoiceWatcher {
    fn drop(&mut self) {
        if self.running.is_some() {
            let _ = self.stop();
        }
    }
}

fn run_worker(
    receiver: mpsc::Receiver<WorkerMessage>,
    dispatcher: Arc<InvoiceDispatcher>,
    stopping: Arc<AtomicBool>,
) {
    for message in receiver {
        match message {
            WorkerMessage::Shutdown => break,
            WorkerMessage::Event(_) if stopping.load(Ordering::SeqCst) => {
                debug!("Dropping event received during shutdown");
            }
            WorkerMessage::Event(Ok(event)) => {
                dispatcher.dispatch(&event);
            }
            WorkerMessage::Event(Err(e)) => {
                warn!("Watch error: {}", e);
            }
        }
    }
    debug!("Watch worker exiting");
}
