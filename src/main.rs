//! `spline-bench`: sweep map sizes, time every enabled variant and
//! cross-validate it against the scalar reference.
//!
//! Environment:
//! - `SPLINE_BENCH_CONFIG`: path to a JSON [`BenchConfig`]; defaults apply otherwise
//! - `SPLINE_BENCH_LOG`: log level for stderr diagnostics (default `warn`)
//! - `SPLINE_BENCH_FORMAT`: `json` prints one JSON object per trial instead
//!   of the table
//!
//! Exit status is 0 when every trial validates, 1 on the first mismatch and
//! 2 when the configuration cannot be loaded.

use spline2d_simd::{report, simd, BenchConfig, BenchError, Harness};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

const CONFIG_ENV: &str = "SPLINE_BENCH_CONFIG";
const LOG_ENV: &str = "SPLINE_BENCH_LOG";
const FORMAT_ENV: &str = "SPLINE_BENCH_FORMAT";

fn load_config() -> Result<BenchConfig, BenchError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            info!(path = ?path, "loading configuration");
            BenchConfig::from_json_file(path)
        }
        None => Ok(BenchConfig::default()),
    }
}

fn main() -> ExitCode {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };
    let mut harness = match Harness::new(config) {
        Ok(harness) => harness,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    info!(features = ?simd::detected_features(), "instruction sets");

    let as_json = std::env::var(FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if !as_json {
        println!("{}", report::preamble(harness.config()));
        println!("{}", report::header(harness.config()));
    }

    let result = harness.run_with(|trial| {
        if as_json {
            match report::json(trial) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("{e}"),
            }
        } else {
            println!("{}", report::row(trial));
        }
    });

    match result {
        Ok(trials) => {
            info!(trials = trials.len(), "sweep complete");
            ExitCode::SUCCESS
        }
        Err(BenchError::Mismatch(mismatch)) => {
            if !as_json {
                println!("{}", report::failure(&mismatch));
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
