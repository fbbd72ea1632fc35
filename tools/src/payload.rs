//! Request-scoped analyzer payload files
//!
//! The error log a request carries is handed to the analyzer as a file
//! path. Each payload file is uniquely named and removed when the guard
//! drops, whatever the outcome of the invocation — success, nonzero exit,
//! timeout, or panic.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

/// Temp file holding one request's error payload
pub struct ErrorPayload {
    file: NamedTempFile,
}

impl ErrorPayload {
    /// Write `contents` to a fresh, uniquely named temp file
    pub fn write(contents: &str) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("heimdall-payload-")
            .suffix(".log")
            .tempfile()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        debug!("Staged analyzer payload at {}", file.path().display());
        Ok(Self { file })
    }

    /// Path handed to the analyzer
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
