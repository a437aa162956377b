//! Log capture for the renderer.
//!
//! The tracing subscriber writes through a [`LogRouter`]. While a renderer
//! holds a [`CaptureGuard`], every formatted line lands in the renderer's
//! [`LogBuffer`] and is drawn below the tree; otherwise lines go to stderr.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// Ordered log lines collected while the renderer draws.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn push(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    /// Append text, one entry per line. A trailing newline does not produce
    /// an empty entry.
    pub fn push_text(&self, text: &str) {
        let mut lines = self.lines.lock();
        lines.extend(text.lines().map(str::to_string));
    }

    /// Snapshot of the lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Whether nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

/// `MakeWriter` that sends log output to the capturing renderer, or to
/// stderr when nothing captures.
#[derive(Debug, Clone, Default)]
pub struct LogRouter {
    target: Arc<Mutex<Option<LogBuffer>>>,
}

impl LogRouter {
    /// Create a router writing to stderr.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send output to `buffer` until the returned guard is dropped, at which
    /// point the previous destination is restored.
    pub fn capture(&self, buffer: LogBuffer) -> CaptureGuard {
        let previous = self.target.lock().replace(buffer);
        CaptureGuard {
            router: self.clone(),
            previous,
        }
    }

    /// Whether output currently goes to a buffer.
    pub fn is_capturing(&self) -> bool {
        self.target.lock().is_some()
    }
}

impl<'a> MakeWriter<'a> for LogRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter {
            target: self.target.lock().clone(),
            pending: Vec::new(),
        }
    }
}

/// Restores the router's previous destination when dropped.
#[derive(Debug)]
pub struct CaptureGuard {
    router: LogRouter,
    previous: Option<LogBuffer>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        *self.router.target.lock() = self.previous.take();
    }
}

/// Writer for one log event.
#[derive(Debug)]
pub struct RoutedWriter {
    target: Option<LogBuffer>,
    pending: Vec<u8>,
}

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.target {
            Some(_) => {
                self.pending.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.target {
            Some(_) => Ok(()),
            None => io::stderr().flush(),
        }
    }
}

impl Drop for RoutedWriter {
    fn drop(&mut self) {
        if let Some(buffer) = &self.target {
            if !self.pending.is_empty() {
                buffer.push_text(&String::from_utf8_lossy(&self.pending));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_text_splits_lines() {
        let buffer = LogBuffer::new();
        buffer.push_text("first\nsecond\n");
        assert_eq!(buffer.lines(), vec!["first", "second"]);
    }

    #[test]
    fn buffer_clones_share_lines() {
        let buffer = LogBuffer::new();
        buffer.clone().push("hello");
        assert!(!buffer.is_empty());
        assert_eq!(buffer.lines(), vec!["hello"]);
    }

    #[test]
    fn router_defaults_to_stderr() {
        let router = LogRouter::new();
        assert!(!router.is_capturing());
    }

    #[test]
    fn captured_writes_land_in_buffer() {
        let router = LogRouter::new();
        let buffer = LogBuffer::new();
        let _guard = router.capture(buffer.clone());

        {
            let mut writer = router.make_writer();
            write!(writer, "INFO ").unwrap();
            writeln!(writer, "compiling").unwrap();
        }

        assert_eq!(buffer.lines(), vec!["INFO compiling"]);
    }

    #[test]
    fn dropping_guard_restores_previous_target() {
        let router = LogRouter::new();
        let outer = LogBuffer::new();
        let inner = LogBuffer::new();

        let outer_guard = router.capture(outer.clone());
        {
            let _inner_guard = router.capture(inner.clone());
            writeln!(router.make_writer(), "to inner").unwrap();
        }
        writeln!(router.make_writer(), "to outer").unwrap();
        drop(outer_guard);

        assert_eq!(inner.lines(), vec!["to inner"]);
        assert_eq!(outer.lines(), vec!["to outer"]);
        assert!(!router.is_capturing());
    }

    #[test]
    fn works_as_tracing_writer() {
        use tracing_subscriber::fmt;

        let router = LogRouter::new();
        let buffer = LogBuffer::new();
        let _guard = router.capture(buffer.clone());

        let subscriber = fmt()
            .with_writer(router.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("fetched 3 packages");
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("fetched 3 packages"));
    }
}
