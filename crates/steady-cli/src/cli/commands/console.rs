//! Console rendering of loop progress. Classified output goes to stdout so it
//! can be piped; lifecycle messages go through tracing on stderr.

use std::io::Write;
use std::sync::Arc;

use steady_core::batch::{BatchSummary, TargetStatus};
use steady_core::convergence::{LoopEvent, LoopSink, TargetOutcome};
use steady_core::render_report;

/// Render classified tokens for the terminal, same layout as the report file.
#[must_use]
pub fn format_tokens(tokens: &[Vec<u8>]) -> String {
    String::from_utf8_lossy(&render_report(tokens)).into_owned()
}

#[must_use]
pub fn format_event(event: &LoopEvent<'_>) -> Option<String> {
    match event {
        LoopEvent::Measured {
            target,
            attempt,
            classified,
        } => Some(format!(
            "[{target}] run {attempt}: {}",
            format_tokens(classified.tokens()).trim()
        )),
        LoopEvent::ChangeDetected { target, .. } => {
            Some(format!("[{target}] change detected, running again..."))
        }
        LoopEvent::WarmupDiscarded { .. } | LoopEvent::Settled { .. } => None,
    }
}

/// Sink that prints classified runs to stdout.
pub fn stdout_sink() -> LoopSink {
    writer_sink(|| std::io::stdout().lock())
}

/// Sink that writes each event line to a freshly opened writer. Write errors
/// (a closed pipe, say) are logged and never interrupt the batch.
pub fn writer_sink<W, F>(open: F) -> LoopSink
where
    W: Write,
    F: Fn() -> W + Send + Sync + 'static,
{
    Arc::new(move |event: &LoopEvent<'_>| {
        if let Some(line) = format_event(event) {
            if let Err(e) = writeln!(open(), "{line}") {
                tracing::debug!(error = %e, "dropping console line");
            }
        }
    })
}

/// One line per target for the end-of-batch summary.
#[must_use]
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for record in &summary.records {
        let line = match &record.status {
            TargetStatus::Settled(TargetOutcome::Stable { attempts, files }) => format!(
                "  {:<10} stable after {attempts} run(s) -> {}",
                record.target,
                files.report.display()
            ),
            TargetStatus::Settled(TargetOutcome::Exhausted { attempts }) => format!(
                "  {:<10} still changing after {attempts} run(s), report not written",
                record.target
            ),
            TargetStatus::Failed(err) => format!("  {:<10} failed: {err}", record.target),
        };
        lines.push(line);
    }
    if let Some(err) = &summary.aborted {
        lines.push(format!("  batch aborted: {err}"));
    }
    for target in &summary.skipped {
        lines.push(format!("  {target:<10} skipped"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use steady_core::classify_output;

    #[test]
    fn measured_event_shows_tokens_with_benchmark_breaks() {
        let classified = classify_output(b"Analyzing bfs/arc time: [1 ms 2 ms 3 ms] No change in performance detected.");
        let line = format_event(&LoopEvent::Measured {
            target: "bfs",
            attempt: 2,
            classified: &classified,
        })
        .unwrap();
        assert_eq!(
            line,
            "[bfs] run 2: bfs/arc [1 ms 2 ms 3 ms] No change in performance"
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_output_does_not_interrupt_the_loop() {
        let sink = writer_sink(|| ClosedPipe);
        let classified = classify_output(b"Performance has regressed.");
        sink(&LoopEvent::Measured {
            target: "pr",
            attempt: 1,
            classified: &classified,
        });
        sink(&LoopEvent::ChangeDetected {
            target: "pr",
            attempt: 1,
            classified: &classified,
        });
    }

    #[test]
    fn summary_lists_skipped_targets() {
        let summary = BatchSummary {
            skipped: vec!["pr".to_string()],
            ..BatchSummary::default()
        };
        assert_eq!(format_summary(&summary), vec!["  pr         skipped"]);
    }
}
