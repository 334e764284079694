//! Benchmark process invocation.
//!
//! One run spawns the configured command with the target substituted into its
//! arguments, waits for it to finish, and hands back everything it printed.
//! There is no timeout and no retry; the caller decides what the output means.

use crate::config::CommandTemplate;
use crate::errors::{SettleError, SettleResult};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Placeholder replaced by the target name in command arguments and path templates.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Captured result of one benchmark invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last `lines` lines of stderr, lossily decoded.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let text = String::from_utf8_lossy(&self.stderr);
        let all: Vec<&str> = text.lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// Something that can run the benchmark suite for a target.
pub trait BenchRunner {
    fn run(&mut self, target: &str) -> SettleResult<RunOutput>;
}

/// Runs the configured external command.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandRunner {
    pub fn new(template: &CommandTemplate) -> Self {
        Self {
            program: template.program.clone(),
            args: template.args.clone(),
            working_dir: template.working_dir.clone(),
        }
    }

    /// Arguments with the target substituted.
    pub fn args_for(&self, target: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, target))
            .collect()
    }

    /// Shell-like rendering of the command line, for logs.
    pub fn display_for(&self, target: &str) -> String {
        let mut line = self.program.clone();
        for arg in self.args_for(target) {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}

impl BenchRunner for CommandRunner {
    fn run(&mut self, target: &str) -> SettleResult<RunOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(target_name = %target, command = %self.display_for(target), "spawning benchmark");
        let started = Instant::now();
        let output = cmd
            .output()
            .map_err(|source| SettleError::ProcessLaunchFailed {
                target: target.to_string(),
                program: self.program.clone(),
                source,
            })?;

        Ok(RunOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(program: &str, args: &[&str]) -> CommandTemplate {
        CommandTemplate {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            working_dir: None,
        }
    }

    #[test]
    fn target_is_substituted_into_every_argument() {
        let runner = CommandRunner::new(&template(
            "cargo",
            &["bench", "--features", "{target}", "--bench={target}_suite"],
        ));
        assert_eq!(
            runner.args_for("sssp"),
            vec!["bench", "--features", "sssp", "--bench=sssp_suite"]
        );
        assert_eq!(
            runner.display_for("sssp"),
            "cargo bench --features sssp --bench=sssp_suite"
        );
    }

    #[test]
    fn missing_program_is_a_launch_failure() {
        let mut runner = CommandRunner::new(&template("steady-no-such-program-xyz", &[]));
        let err = runner.run("bfs").unwrap_err();
        assert!(matches!(
            err,
            SettleError::ProcessLaunchFailed { ref target, .. } if target == "bfs"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn captures_both_streams_and_exit_code() {
        let mut runner = CommandRunner::new(&template(
            "sh",
            &["-c", "echo out-{target}; echo err-{target} >&2; exit 3"],
        ));
        let out = runner.run("tc").unwrap();
        assert_eq!(out.stdout, b"out-tc\n");
        assert_eq!(out.stderr, b"err-tc\n");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let out = RunOutput {
            stderr: b"one\ntwo\nthree\n".to_vec(),
            ..RunOutput::default()
        };
        assert_eq!(out.stderr_tail(2), "two\nthree");
        assert_eq!(out.stderr_tail(10), "one\ntwo\nthree");
    }
}
