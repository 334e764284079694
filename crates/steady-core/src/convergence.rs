//! Re-run a benchmark until its summary stops reporting changes.
//!
//! `Warmup` runs twice and classifies only the second run. `Check` looks for
//! `improved.` / `regressed.`; if found the target is `Unstable` and runs
//! again. A clean summary is `Stable`. With an attempt budget, a target that is
//! still changing when the budget is spent ends `Exhausted` instead of looping
//! forever.

use crate::classify::{classify_output, Classified};
use crate::config::SettleConfig;
use crate::errors::{SettleError, SettleResult};
use crate::report::{ReportFiles, ReportWriter};
use crate::runner::{BenchRunner, RunOutput};
use std::sync::Arc;

const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Warmup,
    Check,
    Unstable,
    Stable,
    Exhausted,
}

/// Verdict of one `Check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Stable,
    Unstable,
    Exhausted,
}

/// Decide what the current summary means. `attempts` counts measured runs so far.
pub fn check(classified: &Classified, attempts: u32, max_attempts: Option<u32>) -> Settlement {
    if !classified.has_change() {
        return Settlement::Stable;
    }
    match max_attempts {
        Some(max) if attempts >= max => Settlement::Exhausted,
        _ => Settlement::Unstable,
    }
}

/// What the loop enforces on each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopPolicy {
    pub max_attempts: Option<u32>,
    pub fail_on_nonzero_exit: bool,
    pub fail_on_empty_summary: bool,
}

impl LoopPolicy {
    pub fn from_config(cfg: &SettleConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            fail_on_nonzero_exit: cfg.fail_on_nonzero_exit,
            fail_on_empty_summary: cfg.fail_on_empty_summary,
        }
    }
}

/// Progress notifications from the loop.
#[derive(Debug)]
pub enum LoopEvent<'a> {
    /// The first warm-up run finished; its output is thrown away.
    WarmupDiscarded {
        target: &'a str,
        output: &'a RunOutput,
    },
    /// A measured run was classified.
    Measured {
        target: &'a str,
        attempt: u32,
        classified: &'a Classified,
    },
    /// The current summary reports a change; another run follows.
    ChangeDetected {
        target: &'a str,
        attempt: u32,
        classified: &'a Classified,
    },
    Settled {
        target: &'a str,
        attempts: u32,
        settlement: Settlement,
    },
}

/// Sink for loop events. The loop calls it synchronously between runs.
pub type LoopSink = Arc<dyn Fn(&LoopEvent<'_>) + Send + Sync>;

/// Terminal result of a loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Convergence {
    Stable { classified: Classified, attempts: u32 },
    Exhausted { classified: Classified, attempts: u32 },
}

impl Convergence {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Stable { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn classified(&self) -> &Classified {
        match self {
            Self::Stable { classified, .. } | Self::Exhausted { classified, .. } => classified,
        }
    }
}

/// Result of settling one target end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Stable { attempts: u32, files: ReportFiles },
    Exhausted { attempts: u32 },
}

pub struct ConvergenceLoop<'r, R: BenchRunner> {
    runner: &'r mut R,
    policy: LoopPolicy,
    sink: Option<LoopSink>,
}

impl<'r, R: BenchRunner> ConvergenceLoop<'r, R> {
    pub fn new(runner: &'r mut R, policy: LoopPolicy) -> Self {
        Self {
            runner,
            policy,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: LoopSink) -> Self {
        self.sink = Some(sink);
        self
    }

    fn emit(&self, event: LoopEvent<'_>) {
        if let Some(sink) = &self.sink {
            sink(&event);
        }
    }

    fn run_once(&mut self, target: &str) -> SettleResult<RunOutput> {
        let output = self.runner.run(target)?;
        tracing::debug!(
            target_name = %target,
            exit_code = ?output.exit_code,
            elapsed_ms = output.elapsed.as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            "benchmark run finished"
        );
        if !output.success() {
            if self.policy.fail_on_nonzero_exit {
                return Err(SettleError::ProcessExitedNonZero {
                    target: target.to_string(),
                    code: output.exit_code,
                    stderr_tail: output.stderr_tail(STDERR_TAIL_LINES),
                });
            }
            tracing::warn!(target_name = %target, exit_code = ?output.exit_code, "benchmark exited unsuccessfully; using its output anyway");
        }
        Ok(output)
    }

    fn measured_run(&mut self, target: &str, attempt: u32) -> SettleResult<Classified> {
        let output = self.run_once(target)?;
        let classified = classify_output(&output.stdout);
        if classified.is_empty() && self.policy.fail_on_empty_summary {
            return Err(SettleError::UnexpectedOutputFormat {
                target: target.to_string(),
                token_count: crate::classify::tokenize(&output.stdout).len(),
            });
        }
        self.emit(LoopEvent::Measured {
            target,
            attempt,
            classified: &classified,
        });
        Ok(classified)
    }

    /// Drive the state machine until the target is stable or out of attempts.
    pub fn converge(&mut self, target: &str) -> SettleResult<Convergence> {
        let mut state = LoopState::Warmup;
        let mut current = Classified::default();
        let mut attempts = 0u32;

        loop {
            tracing::trace!(target_name = %target, ?state, attempts, "loop state");
            state = match state {
                LoopState::Warmup => {
                    tracing::info!(target_name = %target, "starting warm-up run");
                    let discarded = self.run_once(target)?;
                    tracing::debug!(target_name = %target, stdout_bytes = discarded.stdout.len(), "warm-up output discarded");
                    self.emit(LoopEvent::WarmupDiscarded {
                        target,
                        output: &discarded,
                    });
                    tracing::info!(target_name = %target, "warm-up complete, starting measured run");
                    attempts = 1;
                    current = self.measured_run(target, attempts)?;
                    LoopState::Check
                }
                LoopState::Check => match check(&current, attempts, self.policy.max_attempts) {
                    Settlement::Stable => LoopState::Stable,
                    Settlement::Unstable => LoopState::Unstable,
                    Settlement::Exhausted => LoopState::Exhausted,
                },
                LoopState::Unstable => {
                    let markers: Vec<String> = current
                        .change_markers()
                        .iter()
                        .map(|m| String::from_utf8_lossy(m).into_owned())
                        .collect();
                    tracing::warn!(target_name = %target, attempt = attempts, ?markers, "change detected, running again");
                    self.emit(LoopEvent::ChangeDetected {
                        target,
                        attempt: attempts,
                        classified: &current,
                    });
                    attempts += 1;
                    current = self.measured_run(target, attempts)?;
                    LoopState::Check
                }
                LoopState::Stable => {
                    tracing::info!(target_name = %target, attempts, "no change detected");
                    self.emit(LoopEvent::Settled {
                        target,
                        attempts,
                        settlement: Settlement::Stable,
                    });
                    return Ok(Convergence::Stable {
                        classified: std::mem::take(&mut current),
                        attempts,
                    });
                }
                LoopState::Exhausted => {
                    tracing::warn!(target_name = %target, attempts, "attempt budget spent while results still changing");
                    self.emit(LoopEvent::Settled {
                        target,
                        attempts,
                        settlement: Settlement::Exhausted,
                    });
                    return Ok(Convergence::Exhausted {
                        classified: std::mem::take(&mut current),
                        attempts,
                    });
                }
            };
        }
    }

    /// Converge and, once stable, write the report and copy the plot.
    pub fn run_target(&mut self, target: &str, writer: &ReportWriter) -> SettleResult<TargetOutcome> {
        match self.converge(target)? {
            Convergence::Stable {
                classified,
                attempts,
            } => {
                let files = writer.write(target, &classified)?;
                Ok(TargetOutcome::Stable { attempts, files })
            }
            Convergence::Exhausted { attempts, .. } => Ok(TargetOutcome::Exhausted { attempts }),
        }
    }
}
