use anyhow::Result;
use steady_core::{load_config, TargetSpec};

use crate::cli::args::TargetsArgs;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS};

pub fn run(args: TargetsArgs) -> Result<i32> {
    let (cfg, used) = match load_config(args.config.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Config error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };
    if let Err(e) = cfg.validate() {
        eprintln!("Config error: {e}");
        return Ok(CONFIG_ERROR);
    }

    match &used {
        Some(path) => println!("# from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    for line in format_targets(&cfg.targets) {
        println!("{line}");
    }
    Ok(SUCCESS)
}

fn format_targets(targets: &[TargetSpec]) -> Vec<String> {
    targets
        .iter()
        .map(|t| {
            let state = if t.enabled { "enabled" } else { "disabled" };
            format!("{:<10} {state}", t.name)
        })
        .collect()
}
