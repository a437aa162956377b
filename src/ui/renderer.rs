//! Live rendering of a task tree.
//!
//! The renderer owns a redraw loop that reads the tree while the engine
//! mutates it. Each draw builds a full text snapshot: one line per named
//! step, the detailed dump of every captured error, then the captured log
//! lines. The snapshot replaces the previous one in place, and identical
//! snapshots are not written at all.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use console::{measure_text_width, Term};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::tree::{Step, StepStatus, Task};

use super::capture::{CaptureGuard, LogBuffer, LogRouter};
use super::icons::{self, ARROW, PLAY};
use super::spinner::Spinner;
use super::theme::{should_use_colors, Theme};

/// Time between two redraws.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Renderer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Draw at all. When false the renderer does nothing.
    pub print: bool,
    /// Style glyphs and annotations.
    pub colors: bool,
    /// Show a spinner for running steps instead of a static glyph.
    pub animate: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            print: true,
            colors: should_use_colors(),
            animate: Term::stdout().is_term(),
        }
    }
}

impl RendererConfig {
    /// Draw without colors or animation.
    pub fn plain() -> Self {
        Self {
            print: true,
            colors: false,
            animate: false,
        }
    }

    /// Draw nothing.
    pub fn silent() -> Self {
        Self {
            print: false,
            colors: false,
            animate: false,
        }
    }
}

struct Frame {
    task: Task,
    animate: bool,
    theme: Theme,
    spinner: Spinner,
    logs: LogBuffer,
    out: Box<dyn Write + Send>,
    last_text: String,
    hid_cursor: bool,
    /// Fixed terminal width; when unset the width of `term` is used.
    columns: Option<usize>,
    term: Option<Term>,
}

impl Frame {
    fn snapshot(&mut self) -> String {
        self.spinner.tick(Instant::now());

        let mut text = String::from("\n");
        self.push_tree(&self.task, 0, &mut text);

        let reports = error_reports(&self.task);
        if !reports.is_empty() {
            text.push('\n');
            for report in reports {
                text.push_str(&self.theme.failure.apply_to(report).to_string());
                text.push('\n');
            }
        }

        let logs = self.logs.lines();
        if !logs.is_empty() {
            text.push('\n');
            text.push_str(&logs.join("\n"));
        }

        let trimmed = text.trim_end_matches('\n').len();
        text.truncate(trimmed);
        text.push('\n');
        text
    }

    fn push_tree(&self, task: &Task, level: usize, text: &mut String) {
        for step in task.steps() {
            let mut child_level = level;
            if let Some(name) = step.name() {
                text.push_str(&" ".repeat(level * 2));
                text.push_str(&self.step_line(&step, name));
                text.push('\n');
                child_level += 1;
            }
            if let Some(child) = step.child() {
                self.push_tree(child, child_level, text);
            }
        }
    }

    fn step_line(&self, step: &Step, name: &str) -> String {
        let status = step.status();
        let running = if self.animate && !cfg!(windows) {
            self.spinner.frame()
        } else {
            PLAY
        };

        let mut line = format!("{} {}", icons::styled(status, running, &self.theme), name);

        let message = step.error_message().filter(|_| status == StepStatus::Failure);
        if let Some(message) = message {
            let _ = write!(
                line,
                " {} {}",
                self.theme.dim.apply_to(ARROW),
                self.theme.failure.apply_to(message)
            );
        } else if let Some(info) = step.info().filter(|_| status.is_active()) {
            let _ = write!(
                line,
                " {} {}",
                self.theme.dim.apply_to(ARROW),
                self.theme.progress.apply_to(info)
            );
        }

        line
    }

    fn draw(&mut self) -> io::Result<bool> {
        let text = self.snapshot();
        if text == self.last_text {
            return Ok(false);
        }

        let mut frame = String::new();
        let previous_rows = rows(&self.last_text, self.columns());
        if previous_rows > 0 {
            // cursor up, column 0, clear to end of screen
            let _ = write!(frame, "\x1b[{}A\r\x1b[J", previous_rows);
        }
        frame.push_str(&text);

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.last_text = text;
        Ok(true)
    }

    fn columns(&self) -> Option<usize> {
        self.columns.or_else(|| {
            let term = self.term.as_ref()?;
            term.size_checked().map(|(_, cols)| cols as usize)
        })
    }
}

/// Terminal rows occupied by `text` once lines wider than `columns` wrap.
fn rows(text: &str, columns: Option<usize>) -> usize {
    text.lines()
        .map(|line| match columns {
            Some(columns) if columns > 0 => measure_text_width(line).max(1).div_ceil(columns),
            _ => 1,
        })
        .sum()
}

/// Detailed representation of every captured error in the tree, in
/// depth-first insertion order.
fn error_reports(task: &Task) -> Vec<String> {
    let mut reports = Vec::new();
    for step in task.steps() {
        if let Some(report) = step.error_report() {
            reports.push(report);
        }
        if let Some(child) = step.child() {
            reports.extend(error_reports(child));
        }
    }
    reports
}

/// Draws a task tree until finished.
///
/// Dropping an unfinished renderer finishes it, so an interrupted run still
/// gets its final draw and its cursor back.
pub struct Renderer {
    frame: Option<Arc<Mutex<Frame>>>,
    ticker: Option<JoinHandle<()>>,
    capture: Option<CaptureGuard>,
    finished: bool,
}

impl Renderer {
    /// Renderer drawing to stdout.
    pub fn new(task: &Task, config: RendererConfig) -> Self {
        let term = Term::stdout();
        let hide_cursor = config.print && config.animate && term.is_term();
        let renderer = Self::with_output(task, config, term.clone());
        if let Some(frame) = &renderer.frame {
            let mut frame = frame.lock();
            if hide_cursor {
                frame.hid_cursor = term.hide_cursor().is_ok();
            }
            frame.term = Some(term);
        }
        renderer
    }

    /// Renderer drawing to an arbitrary writer.
    pub fn with_output<W>(task: &Task, config: RendererConfig, out: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let frame = config.print.then(|| {
            Arc::new(Mutex::new(Frame {
                task: task.clone(),
                animate: config.animate,
                theme: Theme::for_colors(config.colors),
                spinner: Spinner::new(Instant::now()),
                logs: LogBuffer::new(),
                out: Box::new(out),
                last_text: String::new(),
                hid_cursor: false,
                columns: None,
                term: None,
            }))
        });

        Self {
            frame,
            ticker: None,
            capture: None,
            finished: false,
        }
    }

    /// Wrap lines at `columns` when working out how far to move the cursor
    /// back up before a redraw.
    pub fn with_width(self, columns: usize) -> Self {
        if let Some(frame) = &self.frame {
            frame.lock().columns = Some(columns);
        }
        self
    }

    /// Buffer whose lines are drawn below the tree.
    pub fn logs(&self) -> Option<LogBuffer> {
        self.frame.as_ref().map(|frame| frame.lock().logs.clone())
    }

    /// Route `router`'s output into this renderer until it finishes.
    pub fn capture_logs(&mut self, router: &LogRouter) {
        if let Some(logs) = self.logs() {
            self.capture = Some(router.capture(logs));
        }
    }

    /// Draw once, then keep redrawing every [`REDRAW_INTERVAL`].
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        let Some(frame) = self.frame.clone() else {
            return;
        };

        let _ = self.draw();

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(REDRAW_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;
            loop {
                interval.tick().await;
                let _ = frame.lock().draw();
            }
        }));
    }

    /// Build the current snapshot without writing it.
    pub fn snapshot(&self) -> String {
        match &self.frame {
            Some(frame) => frame.lock().snapshot(),
            None => String::new(),
        }
    }

    /// Write the current snapshot over the previous one.
    ///
    /// Returns `Ok(false)` when nothing was written because the snapshot did
    /// not change.
    pub fn draw(&self) -> io::Result<bool> {
        match &self.frame {
            Some(frame) => frame.lock().draw(),
            None => Ok(false),
        }
    }

    /// Stop redrawing, draw one last time, restore the cursor and release
    /// log capture.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }

        if let Some(frame) = &self.frame {
            let mut frame = frame.lock();
            let _ = frame.draw();
            if frame.hid_cursor {
                let _ = Term::stdout().show_cursor();
                frame.hid_cursor = false;
            }
        }

        self.capture = None;
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.finish();
    }
}
