use anyhow::Result;
use steady_core::{
    load_config, Batch, BatchSummary, CommandRunner, LoopPolicy, ReportLayout, ReportWriter,
    SettleConfig,
};

use super::console;
use crate::cli::args::RunArgs;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS, UNSETTLED};

pub fn run(args: RunArgs) -> Result<i32> {
    let (mut cfg, used) = match load_config(args.config.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };
    match &used {
        Some(path) => tracing::info!(config = %path.display(), "loaded config"),
        None => tracing::info!("no config file found, using built-in defaults"),
    }

    apply_overrides(&mut cfg, &args);
    if let Err(e) = cfg.validate() {
        eprintln!("Config error: {e}");
        return Ok(CONFIG_ERROR);
    }

    let targets: Vec<String> = if args.targets.is_empty() {
        cfg.enabled_targets()
            .into_iter()
            .map(|t| t.name.clone())
            .collect()
    } else {
        match cfg.select(&args.targets) {
            Ok(picked) => picked.into_iter().map(|t| t.name.clone()).collect(),
            Err(e) => {
                eprintln!("Config error: {e}");
                return Ok(CONFIG_ERROR);
            }
        }
    };
    if targets.is_empty() {
        eprintln!("Config error: no enabled targets");
        return Ok(CONFIG_ERROR);
    }

    let mut runner = CommandRunner::new(&cfg.command);
    let writer = ReportWriter::new(ReportLayout::from_config(&cfg));
    let mut batch = Batch::new(&mut runner, &writer, LoopPolicy::from_config(&cfg));
    if !args.quiet {
        batch = batch.with_sink(console::stdout_sink());
    }
    let summary = batch.run(&targets);

    eprintln!("Summary:");
    for line in console::format_summary(&summary) {
        eprintln!("{line}");
    }
    Ok(exit_code_for(&summary))
}

fn apply_overrides(cfg: &mut SettleConfig, args: &RunArgs) {
    if let Some(max) = args.max_attempts {
        cfg.max_attempts = Some(max);
    }
    if let Some(dir) = &args.report_dir {
        cfg.report_dir = dir.clone();
    }
    if args.fail_on_nonzero_exit {
        cfg.fail_on_nonzero_exit = true;
    }
    if args.fail_on_empty_summary {
        cfg.fail_on_empty_summary = true;
    }
}

fn exit_code_for(summary: &BatchSummary) -> i32 {
    if summary.aborted.is_some() {
        CONFIG_ERROR
    } else if summary.all_stable() {
        SUCCESS
    } else {
        UNSETTLED
    }
}
