//! Flat report files: `<report_dir>/<target>.txt` plus a copied plot.
//!
//! The text format is the classified tokens, each followed by one space, with
//! a newline emitted before any token containing `/` (benchmark ids look like
//! `group/name`, so each benchmark starts its own line).

use crate::classify::Classified;
use crate::config::SettleConfig;
use crate::errors::{SettleError, SettleResult};
use crate::runner::TARGET_PLACEHOLDER;
use std::path::{Path, PathBuf};

const DEFAULT_PLOT_EXTENSION: &str = "svg";

/// Render tokens in report format.
pub fn render_report(tokens: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(|t| t.len() + 2).sum());
    for token in tokens {
        if token.contains(&b'/') {
            out.push(b'\n');
        }
        out.extend_from_slice(token);
        out.push(b' ');
    }
    out
}

/// Read a rendered report back into its tokens.
pub fn parse_report(bytes: &[u8]) -> Vec<Vec<u8>> {
    bytes
        .split(|b| *b == b' ' || *b == b'\n')
        .filter(|t| !t.is_empty())
        .map(<[u8]>::to_vec)
        .collect()
}

/// Where a target's report and plot live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    report_dir: PathBuf,
    plot_source: String,
}

impl ReportLayout {
    pub fn new(report_dir: impl Into<PathBuf>, plot_source: impl Into<String>) -> Self {
        Self {
            report_dir: report_dir.into(),
            plot_source: plot_source.into(),
        }
    }

    pub fn from_config(cfg: &SettleConfig) -> Self {
        Self::new(cfg.report_dir.clone(), cfg.plot_source.clone())
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn report_path(&self, target: &str) -> PathBuf {
        self.report_dir.join(format!("{target}.txt"))
    }

    pub fn plot_source(&self, target: &str) -> PathBuf {
        PathBuf::from(self.plot_source.replace(TARGET_PLACEHOLDER, target))
    }

    pub fn plot_destination(&self, target: &str) -> PathBuf {
        let source = self.plot_source(target);
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_PLOT_EXTENSION);
        self.report_dir.join(format!("{target}.{ext}"))
    }
}

/// Files produced for a settled target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub report: PathBuf,
    pub plot: PathBuf,
}

pub struct ReportWriter {
    layout: ReportLayout,
}

impl ReportWriter {
    pub fn new(layout: ReportLayout) -> Self {
        Self { layout }
    }

    /// Copy the plot, then write the report, overwriting previous files.
    ///
    /// The report is only refreshed once its plot is in place, so a missing or
    /// uncopyable artifact leaves the previous report untouched.
    pub fn write(&self, target: &str, classified: &Classified) -> SettleResult<ReportFiles> {
        let plot_src = self.layout.plot_source(target);
        if !plot_src.is_file() {
            return Err(SettleError::ArtifactNotFound {
                target: target.to_string(),
                path: plot_src,
            });
        }

        let write_failed = |path: &Path, source: std::io::Error| SettleError::ReportWriteFailed {
            target: target.to_string(),
            path: path.to_path_buf(),
            source,
        };

        let dir = self.layout.report_dir();
        std::fs::create_dir_all(dir).map_err(|e| write_failed(dir, e))?;

        let plot = self.layout.plot_destination(target);
        std::fs::copy(&plot_src, &plot).map_err(|e| write_failed(plot.as_path(), e))?;

        let report = self.layout.report_path(target);
        std::fs::write(&report, render_report(classified.tokens()))
            .map_err(|e| write_failed(report.as_path(), e))?;

        tracing::info!(
            target_name = %target,
            report = %report.display(),
            plot = %plot.display(),
            "report written"
        );
        Ok(ReportFiles { report, plot })
    }
}
