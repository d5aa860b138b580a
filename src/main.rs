//! Gridcheck - grade spreadsheet artifacts against a rule list

mod config;
mod logging;

use anyhow::{Context, Result};
use gridcheck_core::{Checker, evaluate};
use logging::Verbosity;
use serde_json::Value as JsonValue;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

const EXIT_USAGE: i32 = 1;
const EXIT_CONFIG: i32 = 2;

fn print_usage() {
    eprintln!("Usage: gridcheck [OPTIONS] <CHECKER> <RESULT> [EXPECTED...]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <CHECKER>                 compare_table or compare_csv");
    eprintln!("  <RESULT>                  File produced by the task");
    eprintln!("  [EXPECTED...]             Reference file(s)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -r, --rules <FILE>        Checker options as JSON");
    eprintln!("  --config <FILE>           Config file (default: <config dir>/gridcheck/config.toml)");
    eprintln!("  -v, --verbose             Log rule results (-vv for everything)");
    eprintln!("  -q, --quiet               Log errors only");
    eprintln!("  -h, --help                Print help");
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    print_usage();
    std::process::exit(EXIT_USAGE);
}

struct Cli {
    checker: String,
    result: PathBuf,
    expected: Vec<PathBuf>,
    rules_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    verbosity: Verbosity,
}

fn parse_args(args: &[String]) -> Cli {
    let mut positional: Vec<String> = Vec::new();
    let mut rules_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut verbosity = Verbosity::Normal;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-r" | "--rules" => {
                i += 1;
                if i >= args.len() {
                    usage_error("--rules requires a file path");
                }
                rules_file = Some(PathBuf::from(&args[i]));
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    usage_error("--config requires a file path");
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            "-v" | "--verbose" => {
                verbosity = match verbosity {
                    Verbosity::Verbose | Verbosity::Trace => Verbosity::Trace,
                    _ => Verbosity::Verbose,
                };
            }
            "-vv" => verbosity = Verbosity::Trace,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            arg if arg.starts_with('-') && arg != "-" => {
                usage_error(&format!("Unknown option: {}", arg));
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let Some(checker) = positional.next() else {
        usage_error("missing <CHECKER>");
    };
    let Some(result) = positional.next() else {
        usage_error("missing <RESULT>");
    };
    Cli {
        checker,
        result: PathBuf::from(result),
        expected: positional.map(PathBuf::from).collect(),
        rules_file,
        config_file,
        verbosity,
    }
}

fn read_options(path: Option<&PathBuf>) -> Result<JsonValue> {
    let Some(path) = path else {
        return Ok(JsonValue::Null);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse rules file {}", path.display()))
}

fn run(cli: &Cli, config: &config::Config) -> Result<f64> {
    let checker: Checker = cli.checker.parse()?;
    let options = read_options(cli.rules_file.as_ref())?;
    info!(%checker, result = %cli.result.display(), expected = cli.expected.len(), "grading");
    let score = evaluate(checker, Some(cli.result.as_path()), &cli.expected, &options, config.defaults)?;
    Ok(score)
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args);

    let (config, warnings) = config::load_config(cli.config_file.as_deref());
    logging::init_logging(cli.verbosity, config.log_filter.as_deref());
    for warning in warnings {
        warn!("{}", warning);
    }

    match run(&cli, &config) {
        Ok(score) => println!("{:.1}", score),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}
