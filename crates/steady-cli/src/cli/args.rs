use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "steady",
    version,
    about = "Re-run benchmark suites until their results stop changing, then write a report"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Settle every enabled target (or the ones named) and write reports
    Run(RunArgs),
    /// Classify saved benchmark output and print the summary
    Classify(ClassifyArgs),
    /// List configured targets
    Targets(TargetsArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Config file (defaults to ./steady.yaml when present)
    #[arg(long, short = 'c', env = "STEADY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Settle only these targets, in this order (repeatable). Disabled targets may be named.
    #[arg(long = "target", short = 't', value_name = "NAME")]
    pub targets: Vec<String>,

    /// Measured runs allowed per target before giving up (default: unlimited)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Override the report directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Treat a non-zero benchmark exit code as a failure of that target
    #[arg(long)]
    pub fail_on_nonzero_exit: bool,

    /// Treat output with no recognizable summary as a failure of that target
    #[arg(long)]
    pub fail_on_empty_summary: bool,

    /// Do not echo classified output after each run
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// File holding captured benchmark stdout ("-" or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Print one line per kept token with its stream index and the rule that kept it
    #[arg(long)]
    pub explain: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct TargetsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}
