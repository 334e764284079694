//! Settle a list of targets one after another.

use crate::convergence::{ConvergenceLoop, LoopPolicy, LoopSink, TargetOutcome};
use crate::errors::{ErrorScope, SettleError};
use crate::report::ReportWriter;
use crate::runner::BenchRunner;

/// What happened to one target.
#[derive(Debug)]
pub enum TargetStatus {
    Settled(TargetOutcome),
    Failed(SettleError),
}

#[derive(Debug)]
pub struct TargetRecord {
    pub target: String,
    pub status: TargetStatus,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Records in processing order.
    pub records: Vec<TargetRecord>,
    /// Targets never started because a batch-scoped error stopped the run.
    pub skipped: Vec<String>,
    /// The error that stopped the batch, if any.
    pub aborted: Option<SettleError>,
}

impl BatchSummary {
    pub fn stable(&self) -> impl Iterator<Item = &TargetRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.status, TargetStatus::Settled(TargetOutcome::Stable { .. })))
    }

    pub fn exhausted(&self) -> impl Iterator<Item = &TargetRecord> {
        self.records.iter().filter(|r| {
            matches!(
                r.status,
                TargetStatus::Settled(TargetOutcome::Exhausted { .. })
            )
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = &TargetRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.status, TargetStatus::Failed(_)))
    }

    pub fn all_stable(&self) -> bool {
        self.aborted.is_none() && self.stable().count() == self.records.len()
    }
}

pub struct Batch<'a, R: BenchRunner> {
    runner: &'a mut R,
    writer: &'a ReportWriter,
    policy: LoopPolicy,
    sink: Option<LoopSink>,
}

impl<'a, R: BenchRunner> Batch<'a, R> {
    pub fn new(runner: &'a mut R, writer: &'a ReportWriter, policy: LoopPolicy) -> Self {
        Self {
            runner,
            writer,
            policy,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: LoopSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Settle each target in order. Target-scoped failures are recorded and the
    /// batch moves on; the first batch-scoped failure stops it.
    pub fn run<S: AsRef<str>>(self, targets: &[S]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut remaining = targets.iter();

        for target in remaining.by_ref() {
            let target = target.as_ref();
            tracing::info!(target_name = %target, "settling target");

            let mut lp = ConvergenceLoop::new(&mut *self.runner, self.policy);
            if let Some(sink) = &self.sink {
                lp = lp.with_sink(sink.clone());
            }

            match lp.run_target(target, self.writer) {
                Ok(outcome) => {
                    tracing::info!(target_name = %target, ?outcome, "target done");
                    summary.records.push(TargetRecord {
                        target: target.to_string(),
                        status: TargetStatus::Settled(outcome),
                    });
                }
                Err(err) if err.scope() == ErrorScope::Target => {
                    tracing::error!(target_name = %target, error = %err, "target failed");
                    summary.records.push(TargetRecord {
                        target: target.to_string(),
                        status: TargetStatus::Failed(err),
                    });
                }
                Err(err) => {
                    tracing::error!(target_name = %target, error = %err, "batch aborted");
                    summary.aborted = Some(err);
                    break;
                }
            }
        }

        summary.skipped = remaining.map(|t| t.as_ref().to_string()).collect();
        summary
    }
}
