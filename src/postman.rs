//! Postman collection construction and file output.
//!
//! Endpoints become request items organized into nested folders mirroring
//! their path segments: one folder per non-trailing segment, one request
//! for the final segment. Requests are sorted by path. Query parameters
//! and body properties take their sample values from an optional
//! default-value lookup; a header literally named `authorization` becomes
//! bearer-token auth referencing the `{{authToken}}` variable instead of a
//! header row.

use crate::endpoint::Endpoint;
use crate::text;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_URL: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// A complete collection document.
#[derive(Debug, Serialize)]
pub struct Collection {
    pub info: CollectionInfo,
    pub item: Vec<CollectionNode>,
}

/// Collection metadata.
#[derive(Debug, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub schema: String,
}

/// A node in the collection tree: either a folder of further nodes or a
/// concrete request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CollectionNode {
    Folder {
        name: String,
        item: Vec<CollectionNode>,
    },
    Request {
        name: String,
        request: RequestDefinition,
    },
}

/// One request entry.
#[derive(Debug, Serialize)]
pub struct RequestDefinition {
    pub method: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<HeaderDefinition>,
    pub url: UrlDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthDefinition>,
}

#[derive(Debug, Serialize)]
pub struct HeaderDefinition {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct UrlDefinition {
    pub raw: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParamDefinition>,
}

#[derive(Debug, Serialize)]
pub struct QueryParamDefinition {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct BodyDefinition {
    pub mode: String,
    pub raw: String,
}

#[derive(Debug, Serialize)]
pub struct AuthDefinition {
    #[serde(rename = "type")]
    pub auth_type: String,
    pub bearer: Vec<AuthParam>,
}

#[derive(Debug, Serialize)]
pub struct AuthParam {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

/// Sample values for generated requests, loaded from optional JSON files
/// (`query-param-defaults.json`, `body-defaults.json`,
/// `header-defaults.json`). Missing files yield empty lookups; every miss
/// falls back to the empty string.
#[derive(Debug, Default)]
pub struct ValueDefaults {
    query: HashMap<String, String>,
    body: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl ValueDefaults {
    pub fn load(config_dir: &Path) -> Self {
        Self {
            query: read_defaults(&config_dir.join("query-param-defaults.json")),
            body: read_defaults(&config_dir.join("body-defaults.json")),
            headers: read_defaults(&config_dir.join("header-defaults.json")),
        }
    }

    fn query_default(&self, key: &str) -> String {
        self.query.get(key).cloned().unwrap_or_default()
    }

    fn body_default(&self, key: &str) -> String {
        self.body.get(key).cloned().unwrap_or_default()
    }

    fn header_default(&self, key: &str) -> String {
        self.headers.get(key).cloned().unwrap_or_default()
    }
}

fn read_defaults(path: &Path) -> HashMap<String, String> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!("Ignoring malformed defaults file {}: {}", path.display(), e);
                HashMap::new()
            }
        },
        Err(_) => HashMap::new(),
    }
}

/// Builds collection documents from endpoint lists.
pub struct PostmanBuilder {
    defaults: ValueDefaults,
}

impl PostmanBuilder {
    pub fn new(defaults: ValueDefaults) -> Self {
        Self { defaults }
    }

    /// Builds the collection tree, requests sorted by path ascending.
    pub fn build(&self, collection_name: &str, endpoints: &[Endpoint]) -> Collection {
        let mut sorted: Vec<&Endpoint> =
            endpoints.iter().filter(|e| e.method.is_some()).collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));

        let mut items: Vec<CollectionNode> = Vec::new();
        for endpoint in sorted {
            self.insert_endpoint(&mut items, endpoint);
        }

        Collection {
            info: CollectionInfo {
                name: collection_name.to_string(),
                schema: SCHEMA_URL.to_string(),
            },
            item: items,
        }
    }

    /// Places one endpoint into the folder tree along its path segments.
    fn insert_endpoint(&self, items: &mut Vec<CollectionNode>, endpoint: &Endpoint) {
        let parts: Vec<&str> = endpoint.path.trim_start_matches('/').split('/').collect();
        let last_index = parts.len() - 1;

        let mut current = items;
        for (index, part) in parts.iter().enumerate() {
            if index == last_index {
                current.push(CollectionNode::Request {
                    name: self.request_name(endpoint),
                    request: self.build_request(endpoint),
                });
            } else {
                current = child_folder(current, part);
            }
        }
    }

    /// Name shown for a request: the JSDoc `name` tag when present, a
    /// humanized handler name otherwise, and a path-derived label as the
    /// last resort.
    fn request_name(&self, endpoint: &Endpoint) -> String {
        if let Some(name) = endpoint
            .doc_tags
            .as_ref()
            .and_then(|tags| tags.get("name"))
            .filter(|name| !name.is_empty())
        {
            return name.to_lowercase();
        }
        if let Some(handler_name) = &endpoint.handler_name {
            return text::humanize(handler_name);
        }

        let verb = endpoint
            .method
            .map(|m| text::http_method_to_verb(m.as_str()))
            .unwrap_or("");
        let parts: Vec<&str> = endpoint.path.split('/').collect();
        match parts.last() {
            Some(last) if !last.is_empty() => match last.strip_prefix(':') {
                Some(param) => format!("{} by {}", verb, param),
                None => last.to_string(),
            },
            _ => {
                let parent = if parts.len() >= 2 {
                    parts[parts.len() - 2]
                } else {
                    ""
                };
                format!("{} {}", verb, parent)
            }
        }
    }

    fn build_request(&self, endpoint: &Endpoint) -> RequestDefinition {
        let method = endpoint
            .method
            .map(|m| m.upper().to_string())
            .unwrap_or_else(|| "GET".to_string());

        let query: Vec<QueryParamDefinition> = endpoint
            .query
            .keys()
            .map(|key| QueryParamDefinition {
                key: key.to_string(),
                value: self.defaults.query_default(key),
            })
            .collect();

        let url = UrlDefinition {
            raw: format!("{{{{baseUrl}}}}{}", endpoint.path),
            host: vec!["{{baseUrl}}".to_string()],
            path: endpoint
                .path
                .trim_start_matches('/')
                .split('/')
                .map(str::to_string)
                .collect(),
            query,
        };

        let body = if endpoint.body.is_empty() {
            None
        } else {
            let mut sample = serde_json::Map::new();
            for key in endpoint.body.keys() {
                sample.insert(
                    key.to_string(),
                    Value::String(self.defaults.body_default(key)),
                );
            }
            Some(BodyDefinition {
                mode: "raw".to_string(),
                raw: to_pretty_tabs(&Value::Object(sample)),
            })
        };

        let mut header = Vec::new();
        let mut auth = None;
        for key in endpoint.headers.keys() {
            if key == "authorization" {
                auth = Some(AuthDefinition {
                    auth_type: "bearer".to_string(),
                    bearer: vec![AuthParam {
                        key: "token".to_string(),
                        value: "{{authToken}}".to_string(),
                        param_type: "string".to_string(),
                    }],
                });
            } else {
                header.push(HeaderDefinition {
                    key: text::capitalize(key),
                    value: self.defaults.header_default(key),
                });
            }
        }

        RequestDefinition {
            method,
            header,
            url,
            body,
            auth,
        }
    }
}

/// Finds or creates the folder named `name` and returns its children.
fn child_folder<'a>(items: &'a mut Vec<CollectionNode>, name: &str) -> &'a mut Vec<CollectionNode> {
    // A request with the same name has no children and does not count.
    let position = items.iter().position(
        |node| matches!(node, CollectionNode::Folder { name: existing, .. } if existing == name),
    );
    let index = match position {
        Some(index) => index,
        None => {
            items.push(CollectionNode::Folder {
                name: name.to_string(),
                item: Vec::new(),
            });
            items.len() - 1
        }
    };
    match &mut items[index] {
        CollectionNode::Folder { item, .. } => item,
        _ => unreachable!("position only matches folders"),
    }
}

/// JSON with tab indentation, as the generated request bodies use.
fn to_pretty_tabs(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

/// Builds and writes `<collectionName>.postman_collection.json` into the
/// working directory, returning the absolute path of the written file.
pub fn write_collection(
    collection_name: &str,
    endpoints: &[Endpoint],
    defaults: ValueDefaults,
) -> Result<PathBuf> {
    let builder = PostmanBuilder::new(defaults);
    let collection = builder.build(collection_name, endpoints);

    let filename = format!("{}.postman_collection.json", collection_name);
    let content = serde_json::to_string_pretty(&collection)
        .context("Failed to serialize collection document")?;
    fs::write(&filename, content)
        .with_context(|| format!("Failed to write collection file: {}", filename))?;
    debug!("Wrote collection file {}", filename);

    fs::canonicalize(&filename).with_context(|| format!("Failed to resolve path: {}", filename))
}
