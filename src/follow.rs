//! Follow a file as another process appends to it
//!
//! [`FileLines`] is a blocking iterator: at end-of-file it sleeps for the
//! poll interval and reads again instead of finishing. It only finishes when
//! the file can no longer be read, or when the watched path disappears.
//!
//! An incomplete trailing line (no newline yet) is held back until the rest
//! of it arrives, so a line caught mid-write is yielded once and whole. The
//! one exception is a caller-chosen final marker, which is yielded without a
//! newline as soon as it is complete.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Default wait between reads that found no new data
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest wait between empty reads
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Blocking iterator over lines appended to a file
#[derive(Debug)]
pub struct FileLines {
    reader: BufReader<File>,
    /// Bytes of a line whose newline has not been written yet
    pending: Vec<u8>,
    poll_interval: Duration,
    /// Stop at end-of-file once this path no longer exists
    watch_path: Option<PathBuf>,
    /// Pending text yielded at end-of-file even without a newline
    unterminated_marker: Option<String>,
    finished: bool,
}

impl FileLines {
    /// Follow an open file from its current read position
    pub fn new(file: File) -> Self {
        Self {
            reader: BufReader::new(file),
            pending: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            watch_path: None,
            unterminated_marker: None,
            finished: false,
        }
    }

    /// Set the wait between reads that found no new data (at least 1ms)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Yield a pending line at end-of-file if it trims to `marker`
    ///
    /// For writers whose last line may lack a newline.
    pub fn accept_unterminated(mut self, marker: impl Into<String>) -> Self {
        self.unterminated_marker = Some(marker.into());
        self
    }

    /// End the sequence at end-of-file once `path` has been removed
    ///
    /// On Unix an open handle stays readable after unlink, so removal of the
    /// backing file is only observable through its path.
    pub fn watch_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.watch_path = Some(path.into());
        self
    }

    /// Wait between reads that found no new data
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn source_removed(&self) -> bool {
        self.watch_path.as_deref().is_some_and(|p| !p.exists())
    }

    fn pending_is_marker(&self) -> bool {
        match &self.unterminated_marker {
            Some(marker) if !self.pending.is_empty() => {
                String::from_utf8_lossy(&self.pending).trim() == marker.as_str()
            }
            _ => false,
        }
    }

    fn take_line(&mut self) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Iterator for FileLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }

        loop {
            match self.reader.read_until(b'\n', &mut self.pending) {
                Ok(0) => {
                    if self.pending_is_marker() {
                        return Some(self.take_line());
                    }
                    if self.source_removed() {
                        tracing::debug!("followed file removed, ending line stream");
                        self.finished = true;
                        return None;
                    }
                    tracing::trace!(
                        wait_ms = self.poll_interval.as_millis() as u64,
                        "no new data, waiting"
                    );
                    thread::sleep(self.poll_interval);
                }
                Ok(_) => {
                    if self.pending.last() == Some(&b'\n') {
                        return Some(self.take_line());
                    }
                    // Partial line; the next read returns 0 until the writer catches up
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "followed file unreadable, ending line stream");
                    self.finished = true;
                    return None;
                }
            }
        }
    }
}

impl FusedIterator for FileLines {}

/// Follow `path` from the start, ending once the path is removed
pub fn follow_path(path: &Path) -> std::io::Result<FileLines> {
    let file = File::open(path)?;
    Ok(FileLines::new(file).watch_path(path))
}
