//! Structural fallback extractor.
//!
//! When a handler carries no declared generic request type, field names are
//! recovered from how the handler body uses the request object: either a
//! destructuring (`const { email, password } = req.body`) or a direct
//! property access (`req.body.email`). Fields found this way default to
//! `string` and are always marked optional; a destructured request field is
//! inherently unverifiable as present.

use crate::endpoint::{FieldKind, FieldType, ObjectParameters};
use crate::semantic::{ModuleId, SemanticModel, TypeRef};
use crate::shape::ShapeResolver;
use log::debug;
use tree_sitter::Node;

/// Extracts request fields from member-access patterns in a handler body.
pub struct FallbackExtractor<'a> {
    model: &'a SemanticModel,
}

impl<'a> FallbackExtractor<'a> {
    pub fn new(model: &'a SemanticModel) -> Self {
        Self { model }
    }

    /// Scans `handler_body` for accesses of the shape
    /// `<request_param>.<property>` and collects the fields each occurrence
    /// contributes. Later occurrences of a field overwrite earlier ones.
    pub fn extract(
        &self,
        module: ModuleId,
        request_param: &str,
        property: &str,
        handler_body: Node<'a>,
    ) -> ObjectParameters {
        let mut params = ObjectParameters::new();
        let mut stack = vec![handler_body];
        while let Some(node) = stack.pop() {
            // Depth-first, left-to-right: push children reversed.
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push(child);
            }

            if node.kind() != "member_expression" {
                continue;
            }
            if !self.matches_access(module, node, request_param, property) {
                continue;
            }
            self.collect_from_context(module, node, &mut params);
        }
        debug!(
            "Fallback extraction for {}.{} found {} fields",
            request_param,
            property,
            params.len()
        );
        params
    }

    /// Whether `node` is exactly `<request_param>.<property>`.
    fn matches_access(
        &self,
        module: ModuleId,
        node: Node,
        request_param: &str,
        property: &str,
    ) -> bool {
        let object = match node.child_by_field_name("object") {
            Some(o) => o,
            None => return false,
        };
        let prop = match node.child_by_field_name("property") {
            Some(p) => p,
            None => return false,
        };
        object.kind() == "identifier"
            && self.model.text(module, object) == request_param
            && self.model.text(module, prop) == property
    }

    /// Inspects the syntactic context of a matched access and records the
    /// fields it implies.
    fn collect_from_context(
        &self,
        module: ModuleId,
        access: Node<'a>,
        params: &mut ObjectParameters,
    ) {
        let parent = match access.parent() {
            Some(p) => p,
            None => return,
        };

        match parent.kind() {
            // `const { email, password } = req.body;`
            "variable_declarator" => {
                if parent.child_by_field_name("value") != Some(access) {
                    return;
                }
                let pattern = match parent.child_by_field_name("name") {
                    Some(p) if p.kind() == "object_pattern" => p,
                    _ => return,
                };
                let declared = self.declared_members(module, parent);
                let mut cursor = pattern.walk();
                for binding in pattern.named_children(&mut cursor) {
                    let name = match self.binding_name(module, binding) {
                        Some(n) => n,
                        None => continue,
                    };
                    let ty = declared
                        .as_ref()
                        .and_then(|members| {
                            members
                                .iter()
                                .find(|(n, _)| *n == name)
                                .map(|(_, t)| t.clone())
                        })
                        .unwrap_or_else(|| FieldType::primitive("string"));
                    params.insert(name, Some(ty.optional(true)));
                }
            }
            // `req.body.email`
            "member_expression" => {
                if parent.child_by_field_name("object") != Some(access) {
                    return;
                }
                let prop = match parent.child_by_field_name("property") {
                    Some(p) => p,
                    None => return,
                };
                let name = self.model.text(module, prop).to_string();
                if !name.is_empty() {
                    params.insert(name, Some(FieldType::primitive("string").optional(true)));
                }
            }
            _ => {}
        }
    }

    /// The field name bound by one element of an object pattern.
    fn binding_name(&self, module: ModuleId, binding: Node) -> Option<String> {
        match binding.kind() {
            "shorthand_property_identifier_pattern" => {
                Some(self.model.text(module, binding).to_string())
            }
            // `{ email: userEmail }` records the request field name.
            "pair_pattern" => {
                let key = binding.child_by_field_name("key")?;
                Some(self.model.text(module, key).to_string())
            }
            // `{ email = "default" }`
            "object_assignment_pattern" => {
                let left = binding.child_by_field_name("left")?;
                Some(self.model.text(module, left).to_string())
            }
            _ => None,
        }
    }

    /// Resolved members of an explicit annotation on the declarator
    /// (`const { a }: LoginBody = req.body`), when one is present.
    fn declared_members(
        &self,
        module: ModuleId,
        declarator: Node<'a>,
    ) -> Option<Vec<(String, FieldType)>> {
        let annotation = declarator.child_by_field_name("type")?;
        let ty_node = annotation.named_child(0)?;
        let resolver = ShapeResolver::new(self.model);
        let resolved = resolver.resolve(
            TypeRef {
                module,
                node: ty_node,
            },
            None,
            true,
        )?;
        match resolved.kind {
            FieldKind::Object(properties) => Some(properties),
            _ => None,
        }
    }
}
