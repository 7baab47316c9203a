//! Handler shape extractor.
//!
//! Given a resolved handler declaration, derives the request body, query,
//! headers and response shapes plus display metadata (declared name, JSDoc
//! tags). The request parameter's generic instantiation carries the body
//! shape in a fixed argument slot (`Request<Params, ResBody, ReqBody, ...>`
//! convention); when that yields nothing, field names are recovered by the
//! structural fallback. Query and headers have no generic convention and
//! always go through the fallback.

use crate::endpoint::{FieldKind, FieldType, ObjectParameters};
use crate::fallback::FallbackExtractor;
use crate::semantic::{Declaration, ModuleId, SemanticModel, TypeRef};
use crate::shape::{GenericSubstitution, ShapeResolver};
use log::debug;
use std::collections::BTreeMap;
use tree_sitter::Node;

/// Request parameter type-argument slot that carries the body shape.
const REQUEST_BODY_SLOT: usize = 2;
/// Response parameter type-argument slot that carries the payload shape.
const RESPONSE_BODY_SLOT: usize = 0;

/// Everything a handler contributes to an endpoint.
#[derive(Debug, Default)]
pub struct HandlerShape {
    pub body: ObjectParameters,
    pub query: ObjectParameters,
    pub headers: ObjectParameters,
    pub response: ObjectParameters,
    pub handler_name: Option<String>,
    pub doc_tags: Option<BTreeMap<String, String>>,
}

/// Extracts shapes from handler declarations.
pub struct HandlerShapeExtractor<'a> {
    model: &'a SemanticModel,
}

impl<'a> HandlerShapeExtractor<'a> {
    pub fn new(model: &'a SemanticModel) -> Self {
        Self { model }
    }

    /// Whether a declaration denotes an inspectable handler: a function
    /// value with at least the request and response parameters and a body.
    pub fn is_handler(&self, decl: &Declaration<'a>) -> bool {
        self.model
            .function_node(decl)
            .map(|fn_node| {
                self.model.params_of(fn_node).len() >= 2
                    && fn_node.child_by_field_name("body").is_some()
            })
            .unwrap_or(false)
    }

    /// Extracts the full shape of a handler. Returns `None` when the
    /// declaration does not match the two-parameter handler convention;
    /// absence of type information within a matching handler is not an
    /// error and yields empty shapes instead.
    pub fn extract(
        &self,
        decl: &Declaration<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
    ) -> Option<HandlerShape> {
        let fn_node = self.model.function_node(decl)?;
        let params = self.model.params_of(fn_node);
        if params.len() < 2 {
            return None;
        }
        let body_node = fn_node.child_by_field_name("body")?;
        let module = decl.module;

        let handler_name = self.model.declared_name(decl);
        let doc_tags = self.model.doc_tags_of(decl);
        let request_name = self.model.param_name(module, params[0]);
        debug!(
            "Extracting handler shape (name: {:?}, request param: {:?})",
            handler_name, request_name
        );

        let fallback = FallbackExtractor::new(self.model);

        // Request body: declared generic slot first, structural fallback
        // when the declaration yields no fields at all.
        let mut body = self
            .declared_slot(module, params[0], REQUEST_BODY_SLOT, substitution)
            .unwrap_or_default();
        if body.is_empty() {
            if let Some(request_name) = &request_name {
                body = fallback.extract(module, request_name, "body", body_node);
            }
        }

        // Response: declared only; there is no structural fallback for
        // what a handler writes out.
        let response = self
            .declared_slot(module, params[1], RESPONSE_BODY_SLOT, substitution)
            .unwrap_or_default();

        // Query and headers always come from the handler body.
        let (query, headers) = match &request_name {
            Some(request_name) => (
                fallback.extract(module, request_name, "query", body_node),
                fallback.extract(module, request_name, "headers", body_node),
            ),
            None => (ObjectParameters::new(), ObjectParameters::new()),
        };

        Some(HandlerShape {
            body,
            query,
            headers,
            response,
            handler_name,
            doc_tags,
        })
    }

    /// Shape carried by one type-argument slot of a parameter's declared
    /// type. `None` when the parameter has no generic instantiation or the
    /// slot is missing.
    fn declared_slot(
        &self,
        module: ModuleId,
        param: Node<'a>,
        slot: usize,
        substitution: Option<&GenericSubstitution<'a>>,
    ) -> Option<ObjectParameters> {
        let param_ty = self.model.param_type(module, param)?;
        let args = self.model.type_arguments_of(param_ty);
        let slot_ty = args.get(slot)?;
        Some(self.slot_shape(*slot_ty, substitution))
    }

    /// Interprets a slot type into `ObjectParameters`. Unions and
    /// intersections are not decomposed: the joined constituent names are
    /// stored under the empty-string key. A slot resolving to a non-object
    /// shape uses the same channel.
    fn slot_shape(
        &self,
        slot: TypeRef<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
    ) -> ObjectParameters {
        let mut params = ObjectParameters::new();

        if let Some(joined) = self.join_compound(slot) {
            params.insert("", Some(FieldType::primitive(joined)));
            return params;
        }

        let resolver = ShapeResolver::new(self.model);
        match resolver.resolve(slot, substitution, true) {
            Some(FieldType {
                kind: FieldKind::Object(properties),
                ..
            }) => {
                for (name, ty) in properties {
                    params.insert(name, Some(ty));
                }
            }
            Some(other) => {
                params.insert("", Some(other));
            }
            None => {}
        }
        params
    }

    /// For a union/intersection slot, the distinct constituent type names
    /// joined by the operator.
    fn join_compound(&self, slot: TypeRef<'a>) -> Option<String> {
        let separator = match slot.node.kind() {
            "union_type" => " | ",
            "intersection_type" => " & ",
            _ => return None,
        };
        let mut names: Vec<String> = Vec::new();
        let mut stack = vec![slot.node];
        while let Some(node) = stack.pop() {
            if node.kind() == slot.node.kind() {
                let mut cursor = node.walk();
                let children: Vec<_> = node.named_children(&mut cursor).collect();
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            } else {
                let text = self.model.text(slot.module, node).to_string();
                if !names.contains(&text) {
                    names.push(text);
                }
            }
        }
        Some(names.join(separator))
    }
}
