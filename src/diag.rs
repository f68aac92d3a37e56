//! Diagnostic sink handed to every component that talks to git.
//!
//! Components never log through a global; they receive a [`Diagnostics`]
//! and label each message with the call site that produced it.

use crate::error::Result;
use std::cell::RefCell;
use tracing::Level;

pub trait Diagnostics {
    fn emit(&self, level: Level, site: &str, message: &str);

    fn error(&self, site: &str, message: &str) {
        self.emit(Level::ERROR, site, message);
    }

    fn warn(&self, site: &str, message: &str) {
        self.emit(Level::WARN, site, message);
    }

    fn debug(&self, site: &str, message: &str) {
        self.emit(Level::DEBUG, site, message);
    }
}

/// Forwards diagnostics to the installed `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, level: Level, site: &str, message: &str) {
        match level {
            Level::ERROR => tracing::error!(site, "{message}"),
            Level::WARN => tracing::warn!(site, "{message}"),
            Level::INFO => tracing::info!(site, "{message}"),
            Level::DEBUG => tracing::debug!(site, "{message}"),
            _ => tracing::trace!(site, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub site: String,
    pub message: String,
}

/// Keeps every diagnostic in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.level == Level::ERROR)
            .cloned()
            .collect()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn emit(&self, level: Level, site: &str, message: &str) {
        self.entries.borrow_mut().push(Diagnostic {
            level,
            site: site.to_string(),
            message: message.to_string(),
        });
    }
}

pub trait LogErr<T> {
    /// Report the error (if any) at `site`, then hand the result back unchanged.
    fn log_at(self, diag: &dyn Diagnostics, site: &str) -> Result<T>;
}

impl<T> LogErr<T> for Result<T> {
    fn log_at(self, diag: &dyn Diagnostics, site: &str) -> Result<T> {
        if let Err(e) = &self {
            diag.error(site, &e.to_string());
        }
        self
    }
}
