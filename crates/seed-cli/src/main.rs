//! `seed`: building-file mapping and record reconciliation.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::error;
use tracing::level_filters::LevelFilter;

use seed_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use seed_cli::commands::{load_schema, run_map, run_merge};
use seed_cli::config::Config;
use seed_cli::logging::{LogConfig, LogFormat, init_logging};

mod summary;

use crate::summary::{print_fields, print_mapping, print_provenance};

/// Exit status when duplicate targets block the mapping.
const EXIT_CONFLICTS: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => return fail(&error),
    };

    match &cli.command {
        Command::Fields => match load_schema(None) {
            Ok(schema) => {
                print_fields(&schema);
                ExitCode::SUCCESS
            }
            Err(error) => fail(&error),
        },
        Command::Map(args) => match run_map(args, &config) {
            Ok(outcome) => {
                print_mapping(&outcome);
                if outcome.committed.is_some() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(EXIT_CONFLICTS)
                }
            }
            Err(error) => fail(&error),
        },
        Command::Merge(args) => match run_merge(args) {
            Ok(session) => {
                print_provenance(&session);
                ExitCode::SUCCESS
            }
            Err(error) => fail(&error),
        },
    }
}

fn fail(error: &anyhow::Error) -> ExitCode {
    error!(error = ?error, "command failed");
    eprintln!("error: {error:#}");
    ExitCode::FAILURE
}

/// Explicit `--log-level` wins over `-v/-q`; `RUST_LOG` applies only when
/// neither is given.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig {
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
    .with_level(level)
    .with_format(format)
    .with_log_data(cli.log_data);
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
