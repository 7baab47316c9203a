//! Generated route-type dictionary file.
//!
//! Emits a TypeScript source file exporting a mapping from
//! `"<method> <path>"` to the JSON-rendered body shape, for every endpoint
//! with a non-empty body. The generated file is meant to back a request
//! validator on the analyzed server's side.

use crate::endpoint::Endpoint;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_HEADER: &str = "import { ObjectParameters } from './validator-models';\n\n\
export const routeTypes: { [key: string]: ObjectParameters } = {\n";

/// Renders the dictionary source text.
pub fn render_route_types(endpoints: &[Endpoint]) -> String {
    let mut content = String::from(FILE_HEADER);
    for endpoint in endpoints {
        let method = match endpoint.method {
            Some(m) => m,
            None => continue,
        };
        if endpoint.body.is_empty() {
            continue;
        }
        content.push_str(&format!(
            "    \"{} {}\": {},\n",
            method.as_str(),
            endpoint.path,
            endpoint.body.to_json()
        ));
    }
    content.push_str("}\n");
    content
}

/// Writes the dictionary to `output_path`, creating parent directories,
/// and returns the absolute path of the written file.
pub fn write_route_types(output_path: &Path, endpoints: &[Endpoint]) -> Result<PathBuf> {
    let content = render_route_types(endpoints);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write route types file: {}", output_path.display()))?;
    debug!("Wrote route types file {}", output_path.display());

    fs::canonicalize(output_path)
        .with_context(|| format!("Failed to resolve path: {}", output_path.display()))
}
