use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EditsError>;

#[derive(Error, Debug)]
pub enum EditsError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Command `{command}` failed: {message}")]
    Execution { command: String, message: String },
    #[error("Command `{command}` timed out after {}", format_timeout(.after))]
    TimedOut { command: String, after: Duration },
    #[error("Author not defined for line: {0}")]
    MissingAuthorContext(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Repository error: {0}")]
    Repository(String),
    #[error("Branch {index} ({branch}): {source}")]
    Branch {
        index: usize,
        branch: String,
        #[source]
        source: Box<EditsError>,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_timeout(after: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*after)
}

impl EditsError {
    /// The failure underneath any per-branch wrapping.
    pub fn root(&self) -> &EditsError {
        match self {
            EditsError::Branch { source, .. } => source.root(),
            other => other,
        }
    }
}
