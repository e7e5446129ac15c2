//! Shared event destination

use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// A cloneable handle to a byte sink.
///
/// Clones write to the same sink. Each event is written with a single
/// `write_all` under the sink's own lock, so concurrent events never
/// interleave within a line.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Output {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Write one encoded event and flush it through
    pub fn write_event(&self, bytes: &[u8]) -> io::Result<()> {
        let mut sink = self.sink.lock();
        sink.write_all(bytes)?;
        sink.flush()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.sink.lock().flush()
    }

    /// True when both handles write to the same sink
    pub fn same_sink(&self, other: &Output) -> bool {
        Arc::ptr_eq(&self.sink, &other.sink)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("sink", &Arc::as_ptr(&self.sink))
            .finish()
    }
}
