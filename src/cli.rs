use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Endpoints From Source - Discover HTTP endpoints and request shapes from Express/TypeScript code
#[derive(Parser, Debug)]
#[command(name = "endpoints-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the server entry module
    #[arg(short = 'e', long = "entry", value_name = "ENTRY")]
    pub entry: PathBuf,

    /// Print endpoints to the console
    #[arg(long = "print")]
    pub print: bool,

    /// Name of the Postman collection to generate
    #[arg(long = "postman", value_name = "COLLECTION_NAME")]
    pub postman: Option<String>,

    /// Path of the route-type dictionary file to generate
    #[arg(long = "decorator", value_name = "OUTPUT_PATH")]
    pub decorator: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    // Validate entry module exists
    if !args.entry.exists() {
        anyhow::bail!("Entry module does not exist: {}", args.entry.display());
    }
    if !args.entry.is_file() {
        anyhow::bail!("Entry module is not a file: {}", args.entry.display());
    }

    info!("Entry module: {}", args.entry.display());
    if let Some(ref collection) = args.postman {
        info!("Postman collection: {}", collection);
    }
    if let Some(ref output) = args.decorator {
        info!("Route types output: {}", output.display());
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::decorator;
    use crate::locator::RouteLocator;
    use crate::postman::{self, ValueDefaults};
    use crate::printer;
    use crate::semantic::SemanticModel;

    // Step 1: resolve the entry path and load the module closure
    let entry = args
        .entry
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Cannot resolve entry path {}: {}", args.entry.display(), e))?;
    info!("Parsing entry module {}", entry.display());

    let model = SemanticModel::load(&entry)?;
    info!("Loaded {} modules", model.module_count());

    // Step 2: locate endpoints and infer their shapes
    info!("Discovering endpoints...");
    let locator = RouteLocator::new(&model);
    let endpoints = locator.locate();
    info!("Found {} endpoints", endpoints.len());

    // Step 3: print, unless only generators were requested
    let print_requested = args.print || (args.postman.is_none() && args.decorator.is_none());
    if print_requested {
        printer::print_endpoints(&endpoints);
    }

    // Step 4: Postman collection
    if let Some(collection_name) = &args.postman {
        info!("Generating Postman collection");
        let defaults = ValueDefaults::load(Path::new("config"));
        let written = postman::write_collection(collection_name, &endpoints, defaults)?;
        info!("Wrote Postman collection to {}", written.display());
    }

    // Step 5: route-type dictionary
    if let Some(output_path) = &args.decorator {
        info!("Generating route types file");
        let written = decorator::write_route_types(output_path, &endpoints)?;
        info!("Wrote route types to {}", written.display());
    }

    Ok(())
}
