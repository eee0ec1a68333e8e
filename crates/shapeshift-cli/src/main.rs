//! Shapeshift CLI - command-line front end for type-directed conversion
//!
//! This is the main entry point for the Shapeshift CLI application, providing
//! commands for converting documents against type expressions and for
//! inspecting converter resolution.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    // Configuration is needed before logging starts; a broken file is
    // reported after the logger is up.
    let config = Config::load_with_file(cli.config.as_deref());

    let use_color = cli.use_color()
        && config.as_ref().map(|c| c.output.color).unwrap_or(true);
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, config.as_ref().ok(), use_color) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = config.and_then(|config| run(cli, &config, use_color));

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", error::format_error(&e, use_color));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = config.output_format(cli.output);
    let mut output = OutputWriter::new(format, use_color, cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Convert(args) => handlers::handle_convert(args, config, &mut output),
        Commands::Resolve(args) => handlers::handle_resolve(args, config, &mut output),
        Commands::Completions(args) => {
            handlers::handle_completions(args, &mut std::io::stdout())
        }
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>, use_color: bool) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    if let Some(config) = config {
        logging_config.merge_with_file(&config.logging, cli.verbosity_level());
    }
    logging_config.merge_with_env();
    logging_config.ansi = use_color;

    // quiet mode only logs errors
    if cli.quiet {
        logging_config.level = "error".to_string();
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["shapeshift", "-vv", "resolve", "--target", "int"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["shapeshift", "--quiet", "convert", "in.json", "-t", "int"]);
        assert_eq!(cli.verbosity_level(), 0);
        assert!(cli.quiet);
    }

    #[test]
    fn test_run_resolve_with_defaults() {
        let cli = Cli::parse_from(["shapeshift", "-o", "json", "resolve", "--target", "uuid"]);
        assert!(run(cli, &Config::default(), false).is_ok());
    }
}
