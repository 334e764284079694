use anyhow::Result;

use crate::cli::args::{Cli, Command};

pub fn dispatch(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Command::Run(args) => super::run::run(args),
        Command::Classify(args) => super::classify::run(args),
        Command::Targets(args) => super::targets::run(args),
    }
}
