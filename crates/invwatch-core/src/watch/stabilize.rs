//! Policies for deciding when a newly created file is fully written.
//!
//! None of these are guarantees: a producer that pauses longer than the
//! policy allows will still be read early.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::models::config::StabilizationConfig;

/// Blocks until a file is considered ready to read.
pub trait StabilizationPolicy: Send + Sync {
    /// Wait for `path`. An error means the file is gone or unreadable.
    fn wait(&self, path: &Path) -> std::io::Result<()>;
}

/// Sleep a fixed amount of time, without looking at the file.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl StabilizationPolicy for FixedDelay {
    fn wait(&self, path: &Path) -> std::io::Result<()> {
        debug!("Waiting {:?} before reading {}", self.0, path.display());
        thread::sleep(self.0);
        Ok(())
    }
}

/// Poll the file size until it is unchanged for `stable_checks` polls in a
/// row, giving up (and proceeding) after `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct SizeStable {
    pub interval: Duration,
    pub stable_checks: u32,
    pub timeout: Duration,
}

impl StabilizationPolicy for SizeStable {
    fn wait(&self, path: &Path) -> std::io::Result<()> {
        let start = Instant::now();
        let mut last_len = std::fs::metadata(path)?.len();
        let mut stable = 0;

        while stable < self.stable_checks {
            if start.elapsed() >= self.timeout {
                warn!(
                    "{} still changing after {:?}, reading it anyway",
                    path.display(),
                    self.timeout
                );
                return Ok(());
            }

            thread::sleep(self.interval);
            let len = std::fs::metadata(path)?.len();
            if len == last_len && len > 0 {
                stable += 1;
            } else {
                stable = 0;
                last_len = len;
            }
        }

        debug!(
            "{} stable at {} bytes after {:?}",
            path.display(),
            last_len,
            start.elapsed()
        );
        Ok(())
    }
}

/// Build the policy described by the configuration.
pub fn policy_from_config(config: &StabilizationConfig) -> Box<dyn StabilizationPolicy> {
    match *config {
        StabilizationConfig::FixedDelay { delay_ms } => {
            Box::new(FixedDelay(Duration::from_millis(delay_ms)))
        }
        StabilizationConfig::SizeStable {
            interval_ms,
            stable_checks,
            timeout_ms,
        } => Box::new(SizeStable {
            interval: Duration::from_millis(interval_ms),
            stable_checks,
            timeout: Duration::from_millis(timeout_ms),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay_sleeps() {
        let start = Instant::now();
        FixedDelay(Duration::from_millis(50))
            .wait(Path::new("ignored.png"))
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_size_stable_returns_for_finished_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.png");
        std::fs::write(&path, b"0123456789").unwrap();

        let policy = SizeStable {
            interval: Duration::from_millis(10),
            stable_checks: 2,
            timeout: Duration::from_secs(5),
        };
        let start = Instant::now();
        policy.wait(&path).unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_size_stable_times_out_on_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        let policy = SizeStable {
            interval: Duration::from_millis(10),
            stable_checks: 2,
            timeout: Duration::from_millis(100),
        };
        policy.wait(&path).unwrap();
    }

    #[test]
    fn test_size_stable_missing_file_is_error() {
        let policy = SizeStable {
            interval: Duration::from_millis(10),
            stable_checks: 1,
            timeout: Duration::from_secs(1),
        };
        assert!(policy.wait(Path::new("no/such/file.png")).is_err());
    }

    #[test]
    fn test_policy_from_config() {
        // Zero delay returns immediately.
        let policy = policy_from_config(&StabilizationConfig::FixedDelay { delay_ms: 0 });
        policy.wait(Path::new("x.png")).unwrap();
    }
}
