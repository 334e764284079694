#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn steady(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("steady").expect("steady binary");
    cmd.current_dir(dir)
        .env_remove("STEADY_CONFIG")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn classify_clean_output_exits_zero() {
    let tmp = tempdir().unwrap();
    steady(tmp.path())
        .arg("classify")
        .write_stdin(
            "Benchmarking bfs/arc: Analyzing\n\
             bfs/arc time: [1.20 ms 1.21 ms 1.22 ms]\n\
             No change in performance detected.\n",
        )
        .assert()
        .code(0)
        .stdout("\nbfs/arc [1.20 ms 1.21 ms 1.22 ms] No change in performance \n");
}

#[test]
fn classify_regressed_output_exits_one() {
    let tmp = tempdir().unwrap();
    steady(tmp.path())
        .arg("classify")
        .write_stdin("change: [+3.9% +4.6% +5.3%] Performance has regressed.\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("regressed."));
}

#[test]
fn classify_reads_a_file_argument() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("out.txt"), "noise (p = 0.72 > 0.05) tail").unwrap();
    steady(tmp.path())
        .args(["classify", "out.txt"])
        .assert()
        .code(0)
        .stdout("(p = 0.72 > 0.05) \n");
}

#[test]
fn targets_lists_defaults_without_a_config_file() {
    let tmp = tempdir().unwrap();
    steady(tmp.path())
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("# built-in defaults"))
        .stdout(predicate::str::contains("bc         disabled"))
        .stdout(predicate::str::contains("pr         enabled"));
}

#[test]
fn missing_explicit_config_is_a_config_error() {
    let tmp = tempdir().unwrap();
    steady(tmp.path())
        .args(["targets", "--config", "nope.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn unknown_target_is_a_config_error() {
    let tmp = tempdir().unwrap();
    steady(tmp.path())
        .args(["run", "--target", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown target"));
}

#[cfg(unix)]
mod end_to_end {
    use super::*;

    fn write_config(dir: &Path, script: &str) {
        let yaml = format!(
            "targets: [bfs]\n\
             report_dir: reports\n\
             plot_source: \"criterion/{{target}}/report/violin.svg\"\n\
             command:\n  program: sh\n  args: [\"-c\", \"{script}\"]\n"
        );
        fs::write(dir.join("steady.yaml"), yaml).unwrap();
        let plot_dir = dir.join("criterion/bfs/report");
        fs::create_dir_all(&plot_dir).unwrap();
        fs::write(plot_dir.join("violin.svg"), "<svg/>").unwrap();
    }

    #[test]
    fn stable_target_writes_report_and_plot() {
        let tmp = tempdir().unwrap();
        write_config(tmp.path(), "printf 'No change in performance detected.'");

        steady(tmp.path())
            .arg("run")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("[bfs] run 1: No change in performance"));

        let report = fs::read_to_string(tmp.path().join("reports/bfs.txt")).unwrap();
        assert_eq!(report, "No change in performance ");
        let plot = fs::read_to_string(tmp.path().join("reports/bfs.svg")).unwrap();
        assert_eq!(plot, "<svg/>");
    }

    #[test]
    fn exhausted_target_exits_one_without_report() {
        let tmp = tempdir().unwrap();
        write_config(tmp.path(), "printf 'Performance has regressed.'");

        steady(tmp.path())
            .args(["run", "--max-attempts", "2", "--quiet"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("still changing after 2 run(s)"));

        assert!(!tmp.path().join("reports/bfs.txt").exists());
    }
}
