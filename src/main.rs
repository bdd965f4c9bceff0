//! HVAC simulator entry point: CLI wiring and scenario-driven loop construction.

use std::path::Path;
use std::process;
use std::sync::mpsc;
use std::thread;

use hvac_sim::cli::{self, CliOptions, Command};
use hvac_sim::config::ScenarioConfig;
use hvac_sim::io::export::export_csv;
use hvac_sim::reporting::print_comparison;
use hvac_sim::runner::{self, RunError, RunOutput};
use hvac_sim::sim::controller::ControllerKind;
use hvac_sim::telemetry::init_tracing;

/// Records buffered between the loop and the live printer.
const LIVE_CHANNEL_CAPACITY: usize = 256;

fn load_scenario(cli: &CliOptions) -> Result<ScenarioConfig, String> {
    // --scenario takes priority, then --preset (the parser defaults it to demo)
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path).map_err(|e| e.to_string())?
    } else {
        let name = cli.preset.as_deref().unwrap_or("demo");
        ScenarioConfig::from_preset(name).map_err(|e| e.to_string())?
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(ticks) = cli.ticks {
        scenario.simulation.ticks = ticks;
    }
    if let Some(kind) = cli.controller {
        scenario.simulation.controller = kind.as_str().to_string();
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(lines.join("\n"));
    }
    Ok(scenario)
}

/// Runs one strategy, printing each tick as it completes when paced.
fn run_single(
    scenario: &ScenarioConfig,
    kind: ControllerKind,
    cli: &CliOptions,
) -> Result<RunOutput, RunError> {
    let Some(factor) = cli.realtime else {
        return runner::run_scenario(scenario, kind, !cli.quiet);
    };

    let (tx, rx) = mpsc::sync_channel(LIVE_CHANNEL_CAPACITY);
    let quiet = cli.quiet;
    let printer = thread::spawn(move || {
        for record in rx {
            if !quiet {
                println!("{record}");
            }
        }
    });

    let mut control_loop = runner::build_loop(scenario, kind)?
        .with_realtime(factor)
        .with_publisher(tx);
    let results = control_loop.run();
    drop(control_loop);
    if printer.join().is_err() {
        eprintln!("error: live telemetry printer panicked");
        process::exit(1);
    }

    Ok(runner::summarize(scenario, kind, results?))
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            cli::print_usage();
            return;
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };
    init_tracing(cli.verbose);

    let scenario = match load_scenario(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if cli.compare {
        match runner::run_comparison(&scenario) {
            Ok(outputs) => print_comparison(&outputs),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let Some(kind) = scenario.controller_kind() else {
        eprintln!("error: unknown controller \"{}\"", scenario.simulation.controller);
        process::exit(1);
    };

    let output = match run_single(&scenario, kind, &cli) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("\nController: {kind}");
    println!("{}", output.kpi);

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&output.results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {}", path.display());
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(hvac_sim::api::AppState {
            config: scenario.simulation.sim_config(),
            controller: kind,
            kpi: output.kpi,
            results: output.results,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(hvac_sim::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
