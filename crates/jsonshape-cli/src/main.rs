//! Jsonshape CLI - validate and diff documents against declarative schemas
//!
//! This is the main entry point for the jsonshape CLI application, providing
//! commands for validating documents, asserting them with fallbacks applied,
//! and computing schema-guided diffs.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(e, cli.use_color()),
    };

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);

    let guard = match init_logging(&cli, &config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let result = run(cli, config, use_color);

    // process::exit skips destructors; flush buffered log lines first
    drop(guard);

    match result {
        Ok(()) => process::exit(0),
        Err(e) => exit_with(e, use_color),
    }
}

fn exit_with(e: error::Error, use_color: bool) -> ! {
    eprintln!("{}", error::format_error(&e, use_color));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: Config, use_color: bool) -> Result<()> {
    let timer = Timer::new("cli_execution");

    // An explicit format wins over the configured one
    let format = match cli.output {
        OutputFormat::Human => config.output.format,
        explicit => explicit,
    };
    let mut output = OutputWriter::new(format, use_color, cli.quiet);

    tracing::info!(
        verbosity = cli.verbosity_level(),
        format = ?format,
        "Executing command"
    );

    let result = match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::Diff(args) => handlers::handle_diff(args, &config, &mut output),
        Commands::Assert(args) => handlers::handle_assert(args, &config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args, &mut std::io::stdout()),
    };

    timer.finish();
    result
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<WorkerGuard> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);
    logging_config.merge_with_file(&config.logging, verbosity);

    // Apply environment overrides
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["jsonshape", "-vv", "diff", "s.json", "a.json", "b.json"]);
        assert_eq!(cli.verbosity_level(), 2);
        assert!(matches!(cli.command, Commands::Diff(_)));

        let cli = Cli::parse_from(["jsonshape", "--quiet", "assert", "s.json", "-"]);
        assert_eq!(cli.verbosity_level(), 0);
        assert!(matches!(cli.command, Commands::Assert(_)));
    }
}
