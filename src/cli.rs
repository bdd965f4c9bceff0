use std::env;
use std::path::PathBuf;

use crate::sim::controller::ControllerKind;

/// Parsed command-line options for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub controller: Option<ControllerKind>,
    pub ticks: Option<usize>,
    pub seed: Option<u64>,
    pub telemetry_out: Option<PathBuf>,
    /// Run every strategy on the scenario and print a comparison table.
    pub compare: bool,
    /// Simulated seconds per wall-clock second.
    pub realtime: Option<f64>,
    /// Suppress the per-tick lines.
    pub quiet: bool,
    pub verbose: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            scenario: None,
            preset: None,
            controller: None,
            ticks: None,
            seed: None,
            telemetry_out: None,
            compare: false,
            realtime: None,
            quiet: false,
            verbose: false,
            #[cfg(feature = "api")]
            serve: false,
            #[cfg(feature = "api")]
            port: 3000,
        }
    }
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliOptions),
    Help,
}

pub fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

/// Parses arguments, excluding the program name.
///
/// Without `--scenario` or `--preset` the `demo` preset is selected.
pub fn parse_args_from(args: Vec<String>) -> Result<Command, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--controller" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --controller (expected pid, fuzzy or onoff)",
                )?;
                let kind = name
                    .parse::<ControllerKind>()
                    .map_err(|_| format!("--controller value \"{name}\" is not pid, fuzzy or onoff"))?;
                opts.controller = Some(kind);
            }
            "--ticks" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --ticks (expected a count)")?;
                let ticks = value
                    .parse::<usize>()
                    .map_err(|_| format!("--ticks value \"{value}\" is not a valid count"))?;
                opts.ticks = Some(ticks);
            }
            "--seed" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{value}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--realtime" => {
                i += 1;
                let value = args.next_or_err(
                    i,
                    "missing value for --realtime (expected a speed-up factor)",
                )?;
                let factor = value
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f > 0.0)
                    .ok_or_else(|| format!("--realtime value \"{value}\" must be a number > 0"))?;
                opts.realtime = Some(factor);
            }
            "--compare" => opts.compare = true,
            "--quiet" | "-q" => opts.quiet = true,
            "--verbose" | "-v" => opts.verbose = true,
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = value
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{value}\" is not a valid u16"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if opts.compare && opts.controller.is_some() {
        return Err("`--compare` runs every controller; drop `--controller`".to_string());
    }
    if opts.compare && opts.realtime.is_some() {
        return Err("`--realtime` cannot be combined with `--compare`".to_string());
    }

    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("demo".to_string());
    }

    Ok(Command::Run(opts))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("hvac-sim: building zone HVAC control-loop simulator");
    eprintln!();
    eprintln!("Usage: hvac-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (demo, winter, summer)");
    eprintln!("  --controller <kind>      Override the strategy (pid, fuzzy, onoff)");
    eprintln!("  --ticks <n>              Override the number of ticks");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --telemetry-out <path>   Export step results to CSV");
    eprintln!("  --compare                Run every strategy and print a comparison");
    eprintln!("  --realtime <factor>      Pace ticks at <factor> simulated seconds per second");
    eprintln!("  -q, --quiet              Do not print per-tick lines");
    eprintln!("  -v, --verbose            Debug logging on stderr (or set HVAC_SIM_LOG)");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after simulation");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the demo preset is used.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args_from(args.iter().map(ToString::to_string).collect())
    }

    fn options(args: &[&str]) -> CliOptions {
        match parse(args) {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected run options, got {other:?}"),
        }
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = options(&["--scenario", "scenario.toml"]);
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("scenario.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn defaults_to_demo_preset() {
        let opts = options(&[]);
        assert_eq!(opts.preset.as_deref(), Some("demo"));
        assert!(!opts.compare);
    }

    #[test]
    fn parses_overrides() {
        let opts = options(&[
            "--preset",
            "winter",
            "--controller",
            "fuzzy",
            "--ticks",
            "60",
            "--seed",
            "9",
            "--realtime",
            "600",
            "-q",
        ]);
        assert_eq!(opts.preset.as_deref(), Some("winter"));
        assert_eq!(opts.controller, Some(ControllerKind::Fuzzy));
        assert_eq!(opts.ticks, Some(60));
        assert_eq!(opts.seed, Some(9));
        assert_eq!(opts.realtime, Some(600.0));
        assert!(opts.quiet);
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["--ticks", "5", "--help"]), Ok(Command::Help));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--scenario", "a.toml", "--preset", "demo"]).is_err());
        assert!(parse(&["--controller", "bangbang"]).is_err());
        assert!(parse(&["--ticks"]).is_err());
        assert!(parse(&["--realtime", "0"]).is_err());
        assert!(parse(&["--compare", "--controller", "pid"]).is_err());
        assert!(parse(&["--frobnicate"]).is_err());
    }
}
