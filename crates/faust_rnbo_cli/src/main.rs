//! faust2rnbo: wrap Faust RNBO output in a Max patch
//!
//! Takes the DSP name, the `codebox~` code produced by `faust -lang codebox`,
//! the matching JSON manifest, and the `.maxpat` path to write:
//!
//!   faust2rnbo osc osc.codebox osc.json osc.maxpat
//!
//! Set `FAUST2RNBO_LOG` (or `RUST_LOG`) to e.g. `debug` to trace every control.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use faust_rnbo_core::gen_faust_rnbo;

const LOG_ENV: &str = "FAUST2RNBO_LOG";

/// Generate an RNBO patch from a Faust codebox file and JSON manifest
#[derive(Parser)]
#[command(name = "faust2rnbo")]
#[command(about = "Generate a Max/RNBO patch from Faust codebox output")]
#[command(version)]
struct Cli {
    /// DSP name, used as the rnbo~ title
    dsp_name: String,

    /// Codebox file
    codebox_file: PathBuf,

    /// JSON file
    json_file: PathBuf,

    /// RNBO maxpat file
    maxpat_file: PathBuf,
}

fn init_tracing() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let report = gen_faust_rnbo(
        &cli.dsp_name,
        &cli.codebox_file,
        &cli.json_file,
        &cli.maxpat_file,
    )
    .with_context(|| format!("Failed to generate {}", cli.maxpat_file.display()))?;

    tracing::info!(
        "{}: {} inputs, {} outputs, {} controls -> {}",
        cli.dsp_name,
        report.num_inputs,
        report.num_outputs,
        report.num_controls,
        report.maxpat_path.display()
    );
    Ok(())
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_four_positionals() {
        let cli = Cli::try_parse_from(["faust2rnbo", "osc", "a.codebox", "a.json", "a.maxpat"])
            .unwrap();
        assert_eq!(cli.dsp_name, "osc");
        assert_eq!(cli.codebox_file, PathBuf::from("a.codebox"));
        assert_eq!(cli.json_file, PathBuf::from("a.json"));
        assert_eq!(cli.maxpat_file, PathBuf::from("a.maxpat"));
    }

    #[test]
    fn test_missing_positional_is_rejected() {
        assert!(Cli::try_parse_from(["faust2rnbo", "osc", "a.codebox", "a.json"]).is_err());
    }

    #[test]
    fn test_run_reports_missing_input() {
        let cli = Cli::try_parse_from([
            "faust2rnbo",
            "osc",
            "/nonexistent/a.codebox",
            "/nonexistent/a.json",
            "/nonexistent/a.maxpat",
        ])
        .unwrap();
        let err = run(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to generate"));
    }
}
