// crates/cli/src/progress.rs

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

const REFRESH: Duration = Duration::from_millis(200);

/// Minimal scanned-file ticker on stderr. Stays silent when stderr is not a
/// terminal so logs and pipes are never polluted.
pub(crate) struct Progress {
    enabled: bool,
    printed: bool,
    files: u64,
    last: Instant,
}

impl Progress {
    pub fn new(wanted: bool) -> Self {
        Progress {
            enabled: wanted && io::stderr().is_terminal(),
            printed: false,
            files: 0,
            last: Instant::now(),
        }
    }

    pub fn tick(&mut self) {
        self.files += 1;
        if !self.enabled || self.last.elapsed() < REFRESH {
            return;
        }
        self.last = Instant::now();
        self.printed = true;
        let mut err = io::stderr();
        let _ = write!(err, "\rfiles scanned: {}", self.files);
        let _ = err.flush();
    }

    /// Clear the ticker line before the report is printed.
    pub fn finish(&mut self) {
        if self.printed {
            let mut err = io::stderr();
            let _ = write!(err, "\r\x1b[K");
            let _ = err.flush();
            self.printed = false;
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish();
    }
}
