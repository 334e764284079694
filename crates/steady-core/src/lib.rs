pub mod batch;
pub mod classify;
pub mod config;
pub mod convergence;
pub mod errors;
pub mod report;
pub mod runner;

// Re-export main components for easier use
pub use batch::{Batch, BatchSummary, TargetRecord, TargetStatus};
pub use classify::{classify, classify_output, tokenize, Classified};
pub use config::{load_config, SettleConfig, TargetSpec};
pub use convergence::{
    check, Convergence, ConvergenceLoop, LoopEvent, LoopPolicy, LoopSink, Settlement,
    TargetOutcome,
};
pub use errors::{ErrorScope, SettleError, SettleResult};
pub use report::{render_report, ReportLayout, ReportWriter};
pub use runner::{BenchRunner, CommandRunner, RunOutput};
