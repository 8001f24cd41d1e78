//! Output abstraction layer
//!
//! Lets the CLI print to stdout while tests capture messages in memory.

use colored::Colorize;
use std::sync::{Arc, Mutex, PoisonError};

/// Trait for output operations
///
/// # Examples
///
/// ```
/// use mediapick::output::{OutputWriter, StdoutWriter};
///
/// let output = StdoutWriter::new();
/// output.success("Selection confirmed");
/// output.warning("Selection is full");
/// ```
pub trait OutputWriter: Send + Sync {
    /// Write a normal message
    fn write(&self, message: &str);

    /// Write an error message
    fn error(&self, message: &str);

    /// Write a success message
    fn success(&self, message: &str);

    /// Write a warning message
    fn warning(&self, message: &str);

    /// Write an info message (dimmed/secondary)
    fn info(&self, message: &str);

    /// Emit at the given level
    fn emit(&self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Normal => self.write(message),
            MessageLevel::Error => self.error(message),
            MessageLevel::Success => self.success(message),
            MessageLevel::Warning => self.warning(message),
            MessageLevel::Info => self.info(message),
        }
    }
}

/// Message level for categorizing output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Normal,
    Error,
    Success,
    Warning,
    Info,
}

/// Colored stdout/stderr writer
///
/// In quiet mode only errors and plain results are printed.
#[derive(Debug, Default)]
pub struct StdoutWriter {
    quiet: bool,
}

impl StdoutWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self { quiet: false }
    }

    #[must_use]
    pub const fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl OutputWriter for StdoutWriter {
    fn write(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", "✓".green(), message);
        }
    }

    fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", "!".yellow(), message);
        }
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.dimmed());
        }
    }
}

/// Writer that keeps messages in memory
#[derive(Debug, Clone, Default)]
pub struct BufferedWriter {
    messages: Arc<Mutex<Vec<(MessageLevel, String)>>>,
}

impl BufferedWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message written so far
    #[must_use]
    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages written at `level`
    #[must_use]
    pub fn at(&self, level: MessageLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, level: MessageLevel, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl OutputWriter for BufferedWriter {
    fn write(&self, message: &str) {
        self.push(MessageLevel::Normal, message);
    }

    fn error(&self, message: &str) {
        self.push(MessageLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(MessageLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.push(MessageLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.push(MessageLevel::Info, message);
    }
}
