use std::path::Path;
use std::process::Command;
#[cfg(feature = "api")]
use std::time::{Duration, Instant};

use vpp_benefit_sim::config::SimulationConfig;

#[derive(Debug)]
struct Report {
    savings: f64,
    grid_contributions: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_benefits() {
    let demo = run_and_parse_report(&["--preset", "demo"]);
    let realtime = run_and_parse_report(&["--preset", "realtime"]);
    let evening = run_and_parse_report(&["--config", "scenarios/evening_peak.toml"]);

    // realtime integrates 1/15 of the demo interval per tick
    assert!(
        demo.grid_contributions > realtime.grid_contributions * 5.0,
        "expected demo to out-accrue realtime: demo={:.3}, realtime={:.3}",
        demo.grid_contributions,
        realtime.grid_contributions
    );

    assert!(
        (demo.savings - evening.savings).abs() > 0.01,
        "expected demo and evening_peak savings to differ: demo={:.3}, evening={:.3}",
        demo.savings,
        evening.savings
    );
}

#[test]
fn shipped_scenarios_validate() {
    for path in ["scenarios/evening_peak.toml", "scenarios/overnight.toml"] {
        let config = SimulationConfig::from_toml_file(Path::new(path))
            .unwrap_or_else(|e| panic!("{path}: {e}"));
        let errors = config.validate();
        assert!(errors.is_empty(), "{path}: {errors:?}");
    }
}

#[test]
fn overnight_scenario_runs() {
    let stdout = run(&["--config", "scenarios/overnight.toml"]);
    assert!(stdout.contains("--- Benefit Report ---"));
}

#[test]
fn same_seed_gives_identical_output() {
    let first = run(&["--preset", "demo"]);
    let second = run(&["--preset", "demo"]);
    assert_eq!(first, second);
}

#[test]
fn invalid_config_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_vpp-benefit-sim"))
        .args(["--config", "scenarios/does_not_exist.toml", "--ticks", "1"])
        .output()
        .expect("vpp-benefit-sim process should run");
    assert!(!output.status.success());
}

#[test]
fn headless_clock_follows_sub_second_tick_period() {
    let path = std::env::temp_dir().join(format!("vpp-half-second-{}.toml", std::process::id()));
    std::fs::write(&path, "seed = 1\n\n[timing]\ntick_period_ms = 500\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_vpp-benefit-sim"))
        .arg("--config")
        .arg(&path)
        .args(["--ticks", "121", "--start", "10:00"])
        .env("RUST_LOG", "off")
        .output()
        .expect("vpp-benefit-sim process should run");
    let _ = std::fs::remove_file(&path);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    let times: Vec<&str> = stdout
        .lines()
        .filter(|line| line.starts_with('['))
        .map(|line| &line[1..6])
        .collect();
    assert_eq!(times.len(), 121);
    // 120 half-second ticks make one minute
    assert!(times[..120].iter().all(|t| *t == "10:00"), "{times:?}");
    assert_eq!(times[120], "10:01");
}

#[cfg(feature = "api")]
#[test]
fn serve_exits_when_port_is_taken() {
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port().to_string();

    let mut child = Command::new(env!("CARGO_BIN_EXE_vpp-benefit-sim"))
        .args(["--preset", "demo", "--serve", "--port", &port])
        .env("RUST_LOG", "off")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .expect("vpp-benefit-sim process should start");

    let deadline = Instant::now() + Duration::from_secs(20);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("process kept running without its API server");
        }
        std::thread::sleep(Duration::from_millis(50));
    };
    assert!(!status.success());
    drop(taken);
}

fn run(extra: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_vpp-benefit-sim"))
        .args(extra)
        .args(["--seed", "42", "--ticks", "120", "--start", "15:00"])
        .env("RUST_LOG", "off")
        .output()
        .expect("vpp-benefit-sim process should run");

    assert!(
        output.status.success(),
        "run failed for {extra:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn run_and_parse_report(extra: &[&str]) -> Report {
    let stdout = run(extra);
    Report {
        savings: parse_metric(&stdout, "Cost savings:", ""),
        grid_contributions: parse_metric(&stdout, "Grid contributions:", "kWh"),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing report line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid report format for line `{line}`"));

    let numeric = raw.strip_suffix(unit).unwrap_or(raw).trim().trim_start_matches('$');
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from report line `{line}`"))
}
