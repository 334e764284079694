//! Error types for the convergence runner.

use std::path::PathBuf;

/// How far a failure reaches when a batch of targets is being settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Only the current target is abandoned; later targets still run.
    Target,
    /// The whole batch stops.
    Batch,
}

/// Settle errors.
#[derive(Debug, thiserror::Error)]
pub enum SettleError {
    /// The benchmark command could not be spawned.
    #[error("failed to launch `{program}` for target {target}: {source}")]
    ProcessLaunchFailed {
        target: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The benchmark command exited unsuccessfully (only raised when exit codes are enforced).
    #[error("benchmark for target {target} exited with {}", describe_exit(.code))]
    ProcessExitedNonZero {
        target: String,
        code: Option<i32>,
        /// Last lines of stderr.
        stderr_tail: String,
    },

    /// Nothing in the output matched the summary format (only raised when empty summaries are rejected).
    #[error("output for target {target} contained no recognizable summary ({token_count} tokens scanned)")]
    UnexpectedOutputFormat { target: String, token_count: usize },

    /// The plot artifact was not where the template said it would be.
    #[error("plot artifact for target {target} not found: {}", .path.display())]
    ArtifactNotFound { target: String, path: PathBuf },

    /// Writing the report or copying the plot failed.
    #[error("failed to write {} for target {target}: {source}", .path.display())]
    ReportWriteFailed {
        target: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl SettleError {
    /// Whether the failure only costs the current target or the rest of the batch too.
    pub fn scope(&self) -> ErrorScope {
        match self {
            // A command that cannot start for one target will not start for the next.
            Self::ProcessLaunchFailed { .. } => ErrorScope::Batch,
            Self::ReportWriteFailed { .. } => ErrorScope::Batch,
            Self::Config { .. } => ErrorScope::Batch,

            Self::ProcessExitedNonZero { .. } => ErrorScope::Target,
            Self::UnexpectedOutputFormat { .. } => ErrorScope::Target,
            Self::ArtifactNotFound { .. } => ErrorScope::Target,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type for settle operations.
pub type SettleResult<T> = Result<T, SettleError>;
