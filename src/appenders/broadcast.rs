//! Fan-out writer

use std::fmt;
use std::io::{self, Write};

/// Writes every buffer to each of its writers, in order.
///
/// A failing writer does not stop the others from receiving the buffer. The
/// first error encountered is returned after all writers have been tried.
/// Nothing is retried.
///
/// # Examples
///
/// ```
/// use rust_leveled_logger::appenders::broadcast;
/// use std::io::Write;
///
/// let mut out = broadcast(vec![
///     Box::new(Vec::new()) as Box<dyn Write + Send>,
///     Box::new(std::io::sink()),
/// ]);
/// out.write_all(b"hello\n").unwrap();
/// ```
#[derive(Default)]
pub struct BroadcastWriter {
    writers: Vec<Box<dyn Write + Send>>,
}

/// Build a [`BroadcastWriter`] over `writers`
pub fn broadcast(writers: Vec<Box<dyn Write + Send>>) -> BroadcastWriter {
    BroadcastWriter::new(writers)
}

impl BroadcastWriter {
    pub fn new(writers: Vec<Box<dyn Write + Send>>) -> Self {
        Self { writers }
    }

    /// Append another destination
    #[must_use]
    pub fn with<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    fn each(&mut self, mut op: impl FnMut(&mut dyn Write) -> io::Result<()>) -> io::Result<()> {
        let mut first_err = None;
        for writer in &mut self.writers {
            if let Err(e) = op(writer.as_mut()) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Write for BroadcastWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.each(|w| w.write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.each(|w| w.flush())
    }
}

impl fmt::Debug for BroadcastWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastWriter")
            .field("writers", &self.writers.len())
            .finish()
    }
}
