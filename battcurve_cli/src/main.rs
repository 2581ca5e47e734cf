mod cli;
mod commands;
mod error_fmt;
mod logging;

use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn load_config(path: Option<&Path>) -> Result<battcurve_config::Config> {
    let Some(path) = path else {
        return Ok(battcurve_config::Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = battcurve_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    logging::init_tracing(cli.json, &level, &cfg.logging)?;

    match cli.cmd {
        Commands::Run {
            sim,
            output,
            samples_csv,
            num_points,
        } => commands::run_cycle(&cfg, sim, output, samples_csv, num_points),
        Commands::Voltage => commands::voltage(&cfg),
        Commands::Generate {
            samples,
            output,
            num_points,
        } => commands::generate_offline(&cfg, &samples, output, num_points),
        Commands::Inspect { curve, voltage } => commands::inspect(&curve, voltage),
    }
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if cli::json_mode() {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, "exiting with error");
        std::process::exit(exit_code_for_error(&e));
    }
}
