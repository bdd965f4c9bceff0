use std::fs;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_hvac-sim"))
        .args(args)
        .env("HVAC_SIM_LOG", "error")
        .output()
        .expect("hvac-sim process should run");
    assert!(
        output.status.success(),
        "hvac-sim {args:?} failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|l| l.starts_with(label))
        .unwrap_or_else(|| panic!("missing `{label}` in output:\n{stdout}"));
    line[label.len()..]
        .trim()
        .trim_end_matches(unit)
        .trim()
        .parse()
        .unwrap_or_else(|e| panic!("cannot parse `{line}`: {e}"))
}

#[test]
fn presets_run_via_cli_and_produce_distinct_dynamics() {
    let rmse = |preset: &str| {
        let out = run(&["--preset", preset, "--ticks", "240", "--quiet"]);
        let stdout = String::from_utf8(out.stdout).expect("stdout should be valid UTF-8");
        assert!(stdout.contains("--- KPI Report ---"));
        parse_metric(&stdout, "RMSE temperature:", "°C")
    };
    let winter = rmse("winter");
    let summer = rmse("summer");
    assert!(winter.is_finite() && summer.is_finite());
    assert!(
        (winter - summer).abs() > 1e-3,
        "expected winter and summer RMSE to differ: winter={winter:.3}, summer={summer:.3}"
    );
}

#[test]
fn per_tick_lines_are_printed_unless_quiet() {
    let out = run(&["--preset", "demo", "--ticks", "12"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("t=")).count(), 12);

    let out = run(&["--preset", "demo", "--ticks", "12", "--quiet"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("t=")).count(), 0);
}

#[test]
fn realtime_streams_each_tick_through_the_printer() {
    let out = run(&["--preset", "demo", "--ticks", "5", "--realtime", "1e9"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let ticks: Vec<&str> = stdout.lines().filter(|l| l.starts_with("t=")).collect();
    assert_eq!(ticks.len(), 5, "stdout:\n{stdout}");
    assert!(stdout.contains("--- KPI Report ---"));
    assert!(stdout.contains("Controller: pid"));

    let out = run(&["--preset", "demo", "--ticks", "5", "--realtime", "1e9", "--quiet"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("t=")).count(), 0);
    assert!(stdout.contains("--- KPI Report ---"));
}

#[test]
fn tiny_realtime_factor_runs_unpaced() {
    let out = run(&["--preset", "demo", "--ticks", "3", "--realtime", "1e-300", "--quiet"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--- KPI Report ---"));
}

#[test]
fn compare_prints_every_strategy() {
    let out = run(&["--preset", "demo", "--ticks", "60", "--compare"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--- Controller Comparison ---"));
    for kind in ["pid", "fuzzy", "onoff"] {
        assert!(
            stdout.lines().any(|l| l.starts_with(kind)),
            "missing row for {kind}:\n{stdout}"
        );
    }
}

#[test]
fn scenario_file_exports_csv() {
    let path = std::env::temp_dir().join(format!("hvac-sim-cli-{}.csv", std::process::id()));
    let path_str = path.to_str().expect("temp path should be UTF-8");
    run(&[
        "--scenario",
        "scenarios/summer_onoff.toml",
        "--ticks",
        "30",
        "--quiet",
        "--telemetry-out",
        path_str,
    ]);
    let csv = fs::read_to_string(&path).expect("telemetry file should exist");
    let _ = fs::remove_file(&path);

    let mut lines = csv.lines();
    assert!(lines.next().is_some_and(|h| h.starts_with("tick,time_h")));
    assert_eq!(lines.count(), 30);
}

#[test]
fn invalid_arguments_fail() {
    let status = Command::new(env!("CARGO_BIN_EXE_hvac-sim"))
        .args(["--preset", "arctic"])
        .output()
        .expect("hvac-sim process should run")
        .status;
    assert!(!status.success());

    let status = Command::new(env!("CARGO_BIN_EXE_hvac-sim"))
        .args(["--controller", "bangbang"])
        .output()
        .expect("hvac-sim process should run")
        .status;
    assert!(!status.success());
}
