//! End-to-end tests: live directory watcher, fake OCR, real ledger files.

use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::{DynamicImage, RgbImage};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use invwatch_core::models::config::WatchConfig;
use invwatch_core::watch::FixedDelay;
use invwatch_core::{
    CsvLedger, InvoiceDispatcher, InvoicePipeline, InvoiceRecord, InvoiceWatcher, LedgerStore,
    OcrBackend, OcrError, RuleBasedParser, TextExtractor, XlsxLedger, LEDGER_COLUMNS,
};

/// Returns canned pages in turn and counts calls.
struct ScriptedOcr {
    pages: Vec<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl OcrBackend for ScriptedOcr {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages[n % self.pages.len()].to_string())
    }
}

fn pipeline(
    pages: Vec<&'static str>,
    ledger: Box<dyn LedgerStore>,
) -> (InvoicePipeline, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let ocr = ScriptedOcr {
        pages,
        calls: Arc::clone(&calls),
    };
    let pipeline = InvoicePipeline::new(
        TextExtractor::new(Box::new(ocr)),
        Box::new(RuleBasedParser::new()),
        ledger,
    );
    (pipeline, calls)
}

fn write_image(path: &Path) {
    RgbImage::new(16, 16).save(path).unwrap();
}

fn wait_for_rows(ledger: &dyn LedgerStore, count: usize) -> Vec<InvoiceRecord> {
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        // The worker may be mid-rewrite; a torn read just means "not yet".
        let rows = ledger.load().unwrap_or_default();
        if rows.len() >= count || Instant::now() > deadline {
            return rows;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn test_pipeline_creates_xlsx_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("invoices.xlsx");
    let (pipeline, _) = pipeline(
        vec!["Acme Corp Invoice\nSome details\nTotal: 45.00\n"],
        Box::new(XlsxLedger::new(&ledger_path)),
    );

    let image = dir.path().join("acme.png");
    write_image(&image);

    let record = pipeline.process(&image).unwrap();
    assert_eq!(
        record,
        InvoiceRecord::new("acme.png", "Acme Corp Invoice", Some(Decimal::from_str("45.00").unwrap()))
    );
    assert!(ledger_path.exists());
    assert_eq!(pipeline.ledger().load().unwrap(), vec![record]);
}

#[test]
fn test_extract_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("invoices.csv");
    let (pipeline, _) = pipeline(vec!["No total here"], Box::new(CsvLedger::new(&ledger_path)));

    let image = dir.path().join("plain.jpg");
    write_image(&image);

    let record = pipeline.extract(&image).unwrap();
    assert_eq!(record, InvoiceRecord::new("plain.jpg", "No total here", None));
    assert!(!ledger_path.exists());
}

#[test]
fn test_watcher_records_new_images_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let inbox = dir.path().join("inbox");
    let ledger_path = dir.path().join("ledger.csv");

    let (pipeline, calls) = pipeline(
        vec!["First Invoice\nTotal: 10.00", "Second Invoice\nTOTAL 20.50"],
        Box::new(CsvLedger::new(&ledger_path)),
    );
    let config = WatchConfig {
        directory: inbox.clone(),
        ..WatchConfig::default()
    };
    let dispatcher = InvoiceDispatcher::with_policy(
        config,
        Box::new(FixedDelay(Duration::from_millis(200))),
        pipeline,
    );

    let mut watcher = InvoiceWatcher::new(dispatcher);
    watcher.start().unwrap();
    assert!(inbox.is_dir());

    std::fs::write(inbox.join("photo.gif"), b"GIF89a").unwrap();
    std::fs::create_dir(inbox.join("nested.png")).unwrap();
    write_image(&inbox.join("one.png"));

    let ledger = CsvLedger::new(&ledger_path);
    let rows = wait_for_rows(&ledger, 1);
    assert_eq!(rows.len(), 1);

    write_image(&inbox.join("two.JPEG"));
    let rows = wait_for_rows(&ledger, 2);

    watcher.stop().unwrap();

    assert_eq!(
        rows,
        vec![
            InvoiceRecord::new("one.png", "First Invoice", Some(Decimal::from_str("10.00").unwrap())),
            InvoiceRecord::new("two.JPEG", "Second Invoice", Some(Decimal::from_str("20.50").unwrap())),
        ]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let header = std::fs::read_to_string(&ledger_path).unwrap();
    assert!(header.starts_with(&LEDGER_COLUMNS.join(",")));
}

#[test]
fn test_watcher_restarts_after_stop() {
    let dir = tempfile::tempdir().unwrap();
    let inbox = dir.path().join("inbox");
    let ledger_path = dir.path().join("ledger.csv");

    let (pipeline, _) = pipeline(vec!["Restarted\nTotal: 1.00"], Box::new(CsvLedger::new(&ledger_path)));
    let config = WatchConfig {
        directory: inbox.clone(),
        ..WatchConfig::default()
    };
    let mut watcher = InvoiceWatcher::new(InvoiceDispatcher::with_policy(
        config,
        Box::new(FixedDelay(Duration::from_millis(100))),
        pipeline,
    ));

    watcher.start().unwrap();
    watcher.stop().unwrap();

    // Nothing is recorded while stopped.
    write_image(&inbox.join("while_stopped.png"));
    thread::sleep(Duration::from_millis(300));
    assert!(!ledger_path.exists());

    watcher.start().unwrap();
    write_image(&inbox.join("after_restart.png"));
    let rows = wait_for_rows(&CsvLedger::new(&ledger_path), 1);
    watcher.stop().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].image_name, "after_restart.png");
}
