//! Directory watching: turn file-creation notifications into pipeline runs.
//!
//! Each accepted event moves Idle -> Filtering -> Stabilizing -> Processing
//! -> Idle on a single worker thread, so invoices are recorded one at a time
//! in delivery order. Rejected events go straight back to Idle.

mod controller;
mod stabilize;

pub use controller::{DispatchOutcome, InvoiceDispatcher, InvoiceWatcher};
pub use stabilize::{policy_from_config, FixedDelay, SizeStable, StabilizationPolicy};

use std::path::PathBuf;

use notify::event::CreateKind;
use notify::{Event, EventKind};

use crate::models::config::WatchConfig;

/// A file-creation occurrence in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceEvent {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl InvoiceEvent {
    pub fn new(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            is_dir,
        }
    }

    /// Creation events carried by a notification; other kinds yield nothing.
    pub fn from_notify(event: &Event) -> Vec<Self> {
        let EventKind::Create(kind) = &event.kind else {
            return Vec::new();
        };

        event
            .paths
            .iter()
            .map(|path| {
                let is_dir = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    _ => path.is_dir(),
                };
                Self::new(path.clone(), is_dir)
            })
            .collect()
    }
}

/// Why an event was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Directory,
    UnsupportedExtension,
}

/// Result of filtering one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDecision {
    Accept(PathBuf),
    Ignore(IgnoreReason),
}

/// Filter an event by directory flag and extension.
pub fn classify(event: &InvoiceEvent, config: &WatchConfig) -> EventDecision {
    if event.is_dir {
        EventDecision::Ignore(IgnoreReason::Directory)
    } else if !config.accepts(&event.path) {
        EventDecision::Ignore(IgnoreReason::UnsupportedExtension)
    } else {
        EventDecision::Accept(event.path.clone())
    }
}
