//! Append-only alert log

use super::{Notifier, NotifyError};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Appends one line per alert to a file
pub struct FileNotifier {
    file: Mutex<File>,
}

impl FileNotifier {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NotifyError> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!(path = %path.display(), "Alert log opened");
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl Notifier for FileNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let mut file = self.file.lock();
        writeln!(file, "{}", message)?;
        file.flush()?;
        Ok(())
    }
}
