//! Endpoints From Source - Command-line tool for discovering the HTTP
//! surface of an Express/TypeScript server by static analysis.
//!
//! # Usage
//!
//! ```bash
//! endpoints-from-source --entry <path/to/server.ts> [--print] [--postman <name>] [--decorator <path>]
//! ```
//!
//! # Examples
//!
//! Print all endpoints with their query params, headers and body:
//! ```bash
//! endpoints-from-source -e ~/projects/my-api/src/server.ts --print
//! ```
//!
//! Generate a Postman collection:
//! ```bash
//! endpoints-from-source -e ~/projects/my-api/src/server.ts --postman "My API v1"
//! ```
//!
//! Generate a route-type dictionary for a request validator:
//! ```bash
//! endpoints-from-source -e src/server.ts --decorator src/validators/route-types.generated.ts
//! ```

mod cli;
mod decorator;
mod endpoint;
mod error;
mod fallback;
mod handler;
mod locator;
mod postman;
mod printer;
mod semantic;
mod shape;
mod text;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // We need to parse args twice: once to get verbose flag, then again after logger init
    // First, do a quick parse just to check for verbose flag
    let args_for_verbose = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Endpoints From Source starting...");

    // Now do the full parse with validation
    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    // Run the main workflow
    cli::run(args)?;

    info!("Endpoint discovery completed successfully");

    Ok(())
}
