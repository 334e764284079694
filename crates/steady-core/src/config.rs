//! Run configuration: which targets to settle, how to run them, where reports go.
//!
//! Precedence: built-in defaults < config file. An explicitly named file must
//! exist; the default `steady.yaml` is optional.

use crate::errors::{SettleError, SettleResult};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "steady.yaml";
pub const DEFAULT_REPORT_DIR: &str = "reports/euroroad";
pub const DEFAULT_PLOT_SOURCE: &str = "target/criterion/{target}/report/violin.svg";

/// Built-in target list. `bc` is kept but disabled.
const DEFAULT_TARGETS: [(&str, bool); 6] = [
    ("bc", false),
    ("bfs", true),
    ("tc", true),
    ("sssp", true),
    ("cc", true),
    ("pr", true),
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SettleConfig {
    /// Ordered target list; processed front to back.
    pub targets: Vec<TargetSpec>,
    pub report_dir: PathBuf,
    /// Plot artifact path; `{target}` is substituted.
    pub plot_source: String,
    pub command: CommandTemplate,
    /// Measured runs allowed per target before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
    pub fail_on_nonzero_exit: bool,
    pub fail_on_empty_summary: bool,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS
                .iter()
                .map(|(name, enabled)| TargetSpec {
                    name: (*name).to_string(),
                    enabled: *enabled,
                })
                .collect(),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            plot_source: DEFAULT_PLOT_SOURCE.to_string(),
            command: CommandTemplate::default(),
            max_attempts: None,
            fail_on_nonzero_exit: false,
            fail_on_empty_summary: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CommandTemplate {
    pub program: String,
    /// Arguments; `{target}` is substituted.
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for CommandTemplate {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec![
                "bench".to_string(),
                "--features".to_string(),
                "{target}".to_string(),
            ],
            working_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTarget")]
pub struct TargetSpec {
    pub name: String,
    pub enabled: bool,
}

/// A target is written either as a bare name or as `{ name, enabled }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Name(String),
    Full(FullTarget),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FullTarget {
    name: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl From<RawTarget> for TargetSpec {
    fn from(raw: RawTarget) -> Self {
        match raw {
            RawTarget::Name(name) => Self::new(name),
            RawTarget::Full(FullTarget { name, enabled }) => Self { name, enabled },
        }
    }
}

impl TargetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }
}

impl SettleConfig {
    pub fn from_yaml(text: &str) -> SettleResult<Self> {
        let cfg: Self = serde_yaml::from_str(text)
            .map_err(|e| SettleError::config(format!("parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SettleResult<()> {
        let mut seen = BTreeSet::new();
        for target in &self.targets {
            let name = target.name.as_str();
            if name.is_empty() {
                return Err(SettleError::config("target name must not be empty"));
            }
            if name.chars().any(|c| c.is_whitespace() || c == '/') {
                return Err(SettleError::config(format!(
                    "target name {name:?} must not contain whitespace or '/'"
                )));
            }
            if !seen.insert(name) {
                return Err(SettleError::config(format!("duplicate target {name:?}")));
            }
        }
        if self.command.program.trim().is_empty() {
            return Err(SettleError::config("command.program must not be empty"));
        }
        if self.plot_source.trim().is_empty() {
            return Err(SettleError::config("plot_source must not be empty"));
        }
        if self.max_attempts == Some(0) {
            return Err(SettleError::config("max_attempts must be at least 1"));
        }
        Ok(())
    }

    /// Enabled targets in configured order.
    pub fn enabled_targets(&self) -> Vec<&TargetSpec> {
        self.targets.iter().filter(|t| t.enabled).collect()
    }

    /// Targets picked by name, in the order given. Disabled targets may be picked explicitly.
    pub fn select(&self, names: &[String]) -> SettleResult<Vec<&TargetSpec>> {
        names
            .iter()
            .map(|name| {
                self.targets
                    .iter()
                    .find(|t| &t.name == name)
                    .ok_or_else(|| SettleError::config(format!("unknown target {name:?}")))
            })
            .collect()
    }
}

/// Load config. Returns the file actually read, if any.
pub fn load_config(config_file: Option<&Path>) -> SettleResult<(SettleConfig, Option<PathBuf>)> {
    let (path, explicit) = match config_file {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    match std::fs::read_to_string(&path) {
        Ok(text) => {
            let cfg = SettleConfig::from_yaml(&text)?;
            Ok((cfg, Some(path)))
        }
        Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
            Ok((SettleConfig::default(), None))
        }
        Err(e) => Err(SettleError::config(format!(
            "failed to read config file {}: {e}",
            path.display()
        ))),
    }
}
