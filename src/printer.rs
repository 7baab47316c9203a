//! Console listing of discovered endpoints.
//!
//! One block per endpoint: a `[METHOD] /path` header, a `body:` block for
//! non-GET methods, comma-joined `query:` and `headers:` lines and a
//! `response:` block. Nested object fields are indented, array shapes are
//! suffixed `[]` and undeterminable types render as `null`.

use crate::endpoint::{Endpoint, FieldKind, FieldType, HttpMethod, ObjectParameters};
use std::fmt::Write;

/// Formats the whole endpoint list; the result is printed verbatim.
pub fn format_endpoints(endpoints: &[Endpoint]) -> String {
    let mut out = String::new();
    for endpoint in endpoints {
        let method = match endpoint.method {
            Some(m) => m,
            None => continue,
        };
        let _ = writeln!(out, "[{}] {}", method.upper(), endpoint.path);

        if method != HttpMethod::Get && !endpoint.body.is_empty() {
            let _ = writeln!(out, "  body:");
            write_fields(&mut out, &endpoint.body, 2);
        }
        if !endpoint.query.is_empty() {
            let names: Vec<_> = endpoint.query.keys().collect();
            let _ = writeln!(out, "  query: {}", names.join(", "));
        }
        if !endpoint.headers.is_empty() {
            let names: Vec<_> = endpoint.headers.keys().collect();
            let _ = writeln!(out, "  headers: {}", names.join(", "));
        }
        if !endpoint.response.is_empty() {
            let _ = writeln!(out, "  response:");
            write_fields(&mut out, &endpoint.response, 2);
        }
        let _ = writeln!(out);
    }
    out
}

/// Prints the listing to stdout.
pub fn print_endpoints(endpoints: &[Endpoint]) {
    print!("{}", format_endpoints(endpoints));
}

fn write_fields(out: &mut String, params: &ObjectParameters, depth: usize) {
    let pad = "  ".repeat(depth);
    for (name, ty) in params.iter() {
        let display_name = if name.is_empty() { "(value)" } else { name };
        match ty {
            None => {
                let _ = writeln!(out, "{}{}: null", pad, display_name);
            }
            Some(ty) => write_field(out, display_name, ty, depth),
        }
    }
}

fn write_field(out: &mut String, name: &str, ty: &FieldType, depth: usize) {
    let pad = "  ".repeat(depth);
    let optional = if ty.is_optional { "?" } else { "" };
    match &ty.kind {
        FieldKind::Primitive(p) => {
            let _ = writeln!(out, "{}{}{}: {}", pad, name, optional, p);
        }
        FieldKind::Literal(value) => {
            let _ = writeln!(out, "{}{}{}: \"{}\"", pad, name, optional, value);
        }
        FieldKind::Array(items) => match items {
            Some(items) => match &items.kind {
                FieldKind::Object(properties) => {
                    let _ = writeln!(out, "{}{}{}: object[]", pad, name, optional);
                    write_properties(out, properties, depth + 1);
                }
                _ => {
                    let _ = writeln!(
                        out,
                        "{}{}{}: {}[]",
                        pad,
                        name,
                        optional,
                        inline_label(items)
                    );
                }
            },
            None => {
                let _ = writeln!(out, "{}{}{}: null[]", pad, name, optional);
            }
        },
        FieldKind::Object(properties) => {
            let _ = writeln!(out, "{}{}{}:", pad, name, optional);
            write_properties(out, properties, depth + 1);
        }
        FieldKind::Enum(members) => {
            let values: Vec<String> = members
                .iter()
                .map(|(member, ty)| match &ty.kind {
                    FieldKind::Literal(value) => format!("\"{}\"", value),
                    _ => member.clone(),
                })
                .collect();
            let _ = writeln!(out, "{}{}{}: enum[{}]", pad, name, optional, values.join(", "));
        }
    }
}

fn write_properties(out: &mut String, properties: &[(String, FieldType)], depth: usize) {
    for (name, ty) in properties {
        write_field(out, name, ty, depth);
    }
}

/// Short label for array element shapes that render on one line.
fn inline_label(ty: &FieldType) -> String {
    match &ty.kind {
        FieldKind::Primitive(p) => p.clone(),
        FieldKind::Literal(value) => format!("\"{}\"", value),
        FieldKind::Enum(_) => "enum".to_string(),
        FieldKind::Object(_) => "object".to_string(),
        FieldKind::Array(inner) => match inner {
            Some(inner) => format!("{}[]", inline_label(inner)),
            None => "null[]".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::FieldType;

    fn sample_endpoint() -> Endpoint {
        let mut endpoint = Endpoint::child_with_path("/api/login".to_string());
        endpoint.method = Some(HttpMethod::Post);
        endpoint
            .body
            .insert("email", Some(FieldType::primitive("string")));
        endpoint.body.insert("attempts", None);
        endpoint
            .query
            .insert("redirect", Some(FieldType::primitive("string")));
        endpoint
            .response
            .insert("token", Some(FieldType::primitive("string")));
        endpoint
    }

    #[test]
    fn test_header_line_and_blocks() {
        let out = format_endpoints(&[sample_endpoint()]);
        assert!(out.contains("[POST] /api/login"));
        assert!(out.contains("  body:"));
        assert!(out.contains("    email: string"));
        assert!(out.contains("    attempts: null"));
        assert!(out.contains("  query: redirect"));
        assert!(out.contains("  headers: content-type"));
        assert!(out.contains("  response:"));
        assert!(out.contains("    token: string"));
    }

    #[test]
    fn test_get_endpoint_has_no_body_block() {
        let mut endpoint = sample_endpoint();
        endpoint.method = Some(HttpMethod::Get);
        let out = format_endpoints(&[endpoint]);
        assert!(out.contains("[GET] /api/login"));
        assert!(!out.contains("body:"));
    }

    #[test]
    fn test_nested_and_array_fields() {
        let mut endpoint = Endpoint::child_with_path("/users".to_string());
        endpoint.method = Some(HttpMethod::Post);
        endpoint.body.insert(
            "profile",
            Some(FieldType::object(vec![(
                "bio".to_string(),
                FieldType::primitive("string"),
            )])),
        );
        endpoint.body.insert(
            "tags",
            Some(FieldType::array(Some(FieldType::primitive("string")))),
        );

        let out = format_endpoints(&[endpoint]);
        assert!(out.contains("    profile:"));
        assert!(out.contains("      bio: string"));
        assert!(out.contains("    tags: string[]"));
    }

    #[test]
    fn test_optional_marker() {
        let mut endpoint = Endpoint::child_with_path("/x".to_string());
        endpoint.method = Some(HttpMethod::Post);
        endpoint.body.insert(
            "nickname",
            Some(FieldType::primitive("string").optional(true)),
        );
        let out = format_endpoints(&[endpoint]);
        assert!(out.contains("    nickname?: string"));
    }
}
