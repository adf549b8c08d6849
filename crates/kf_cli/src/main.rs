//! kustforge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Any validation, apply or runtime failure, or user interrupt

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod interrupt;

use commands::{Cli, Commands};

/// Default log directives when `RUST_LOG` is unset.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "kustforge=info,kf_core=info,kf_templates=info,kf_aws=info,kf_policy=info,warn"
    }
}

fn init_logging(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    // Already initialised in tests; nothing to do then.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    interrupt::install();

    let result = match &cli.command {
        Commands::Process(args) => commands::process::execute(&cli.global, args),
        Commands::Render(args) => commands::render::execute(&cli.global, args),
        Commands::Validate(args) => commands::validate::execute(&cli.global, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_include_library_crates() {
        let directives = default_directives(false);
        for target in ["kustforge=info", "kf_core=info", "kf_templates=info", "kf_aws=info"] {
            assert!(directives.contains(target), "missing {}", target);
        }
        assert!(EnvFilter::try_new(directives).is_ok());
        assert_eq!(default_directives(true), "debug");
    }
}
