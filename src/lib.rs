//! Endpoints From Source - HTTP surface discovery from Express/TypeScript code.
//!
//! This library statically discovers the HTTP endpoints of a TypeScript or
//! JavaScript server program, without executing it, and infers the shape
//! (field names, types, optionality, nesting) of each endpoint's request
//! body, query parameters, headers and response payload. The results feed
//! a console listing, a Postman collection file or a generated route-type
//! dictionary.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`semantic`] - Loads the entry module plus its import closure and
//!    exposes the symbol/type oracle over the syntax trees
//! 2. [`locator`] - Finds route-registration calls (`use`, `get`, `put`,
//!    `post`, `delete`, `patch`), accumulates path prefixes and recurses
//!    through mounted sub-routers
//! 3. [`handler`] - Extracts a handler's body/query/headers/response shape
//! 4. [`shape`] - Resolves semantic types into structural field trees
//! 5. [`fallback`] - Recovers field names from `req.body`-style patterns
//!    when no declared type exists
//! 6. [`endpoint`] - The `Endpoint`/`FieldType` data model
//! 7. [`printer`], [`postman`], [`decorator`] - Output surfaces
//!
//! # Example Usage
//!
//! ```no_run
//! use endpoints_from_source::{locator::RouteLocator, semantic::SemanticModel};
//! use std::path::Path;
//!
//! let model = SemanticModel::load(Path::new("./my-api/src/server.ts")).unwrap();
//! let endpoints = RouteLocator::new(&model).locate();
//! for endpoint in &endpoints {
//!     println!("{:?} {}", endpoint.method, endpoint.path);
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete
//! CLI application.

pub mod cli;
pub mod decorator;
pub mod endpoint;
pub mod error;
pub mod fallback;
pub mod handler;
pub mod locator;
pub mod postman;
pub mod printer;
pub mod semantic;
pub mod shape;
pub mod text;
