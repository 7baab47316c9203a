//! Route-call locator and recursive traversal.
//!
//! Walks a module's syntax tree for registration calls on a router-like
//! object (`use, get, put, post, delete, patch`), accumulates path
//! prefixes, resolves indirections (imports, re-exports, mounted
//! sub-routers) across modules and drives the handler shape extractor for
//! every matched verb call. Endpoints are collected in discovery order,
//! depth-first and left-to-right.

use crate::endpoint::{Endpoint, HttpMethod};
use crate::handler::{HandlerShape, HandlerShapeExtractor};
use crate::semantic::{Declaration, ModuleId, SemanticModel};
use crate::shape::GenericSubstitution;
use log::{debug, warn};
use std::collections::HashSet;
use tree_sitter::Node;

/// Callee names that make a call expression a route registration.
const ROUTE_CALLEES: &[&str] = &["use", "get", "put", "post", "delete", "patch"];

/// Discovers endpoints over a loaded semantic model.
pub struct RouteLocator<'a> {
    model: &'a SemanticModel,
    extractor: HandlerShapeExtractor<'a>,
}

impl<'a> RouteLocator<'a> {
    pub fn new(model: &'a SemanticModel) -> Self {
        Self {
            model,
            extractor: HandlerShapeExtractor::new(model),
        }
    }

    /// Runs the traversal from the entry module and returns every
    /// discovered endpoint.
    pub fn locate(&self) -> Vec<Endpoint> {
        let mut found = Vec::new();
        let mut visiting = HashSet::new();
        self.delint(self.model.entry(), &Endpoint::root(), &mut visiting, &mut found);
        debug!("Traversal finished with {} endpoints", found.len());
        found
    }

    /// Processes one module's tree under an inherited partial endpoint.
    ///
    /// The visiting set holds the modules on the current recursion stack;
    /// re-entering one of them means a mount cycle, and the branch is
    /// pruned instead of recursing forever. Keying by accumulated path as
    /// well would not converge, because a cycle keeps growing the path.
    fn delint(
        &self,
        module: ModuleId,
        inherited: &Endpoint,
        visiting: &mut HashSet<ModuleId>,
        found: &mut Vec<Endpoint>,
    ) {
        if !visiting.insert(module) {
            warn!(
                "Mount cycle detected at {} (prefix '{}'), pruning",
                self.model.module(module).path.display(),
                inherited.path
            );
            return;
        }

        for (callee, args) in self.route_calls(module) {
            // A registration needs a path argument and at least one
            // handler or router argument.
            if args.len() < 2 {
                continue;
            }

            let fragment = self.model.string_value(module, args[0]);
            let path = normalize_path(&inherited.path, &fragment);

            match HttpMethod::from_callee(&callee) {
                Some(method) => {
                    let mut endpoint = Endpoint::child_with_path(path.clone());
                    endpoint.method = Some(method);

                    // Arguments that turn out not to be handlers are
                    // indirections, visited after the endpoint is final.
                    let mut indirections: Vec<Declaration<'a>> = Vec::new();
                    for arg in &args[1..] {
                        match self.resolve_handler(module, *arg) {
                            Some((decl, substitution))
                                if self.extractor.is_handler(&decl) =>
                            {
                                if let Some(shape) =
                                    self.extractor.extract(&decl, substitution.as_ref())
                                {
                                    apply_shape(&mut endpoint, shape);
                                }
                            }
                            Some((decl, _)) => indirections.push(decl),
                            None => {
                                // Unresolvable symbol: the endpoint is
                                // still recorded, with method and path only.
                                debug!(
                                    "Unresolvable argument for {} {}",
                                    callee, path
                                );
                            }
                        }
                    }

                    debug!("Found endpoint: {} {}", method.upper(), endpoint.path);
                    found.push(endpoint);

                    for decl in indirections {
                        self.delint(
                            decl.module,
                            &Endpoint::child_with_path(path.clone()),
                            visiting,
                            found,
                        );
                    }
                }
                None => {
                    // A `use` mount never yields an endpoint itself; it
                    // only propagates the prefix into the mounted module.
                    for arg in &args[1..] {
                        if let Some((decl, _)) = self.resolve_handler(module, *arg) {
                            self.delint(
                                decl.module,
                                &Endpoint::child_with_path(path.clone()),
                                visiting,
                                found,
                            );
                        }
                    }
                }
            }
        }

        visiting.remove(&module);
    }

    /// Collects route registration calls in document order.
    fn route_calls(&self, module: ModuleId) -> Vec<(String, Vec<Node<'a>>)> {
        let model = self.model;
        let mut calls = Vec::new();
        let mut stack = vec![model.root(module)];
        while let Some(node) = stack.pop() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push(child);
            }

            if node.kind() != "call_expression" {
                continue;
            }
            let Some(function) = node.child_by_field_name("function") else {
                continue;
            };
            if function.kind() != "member_expression" {
                continue;
            }
            let Some(property) = function.child_by_field_name("property") else {
                continue;
            };
            let callee = model.text(module, property).to_string();
            if !ROUTE_CALLEES.contains(&callee.as_str()) {
                continue;
            }
            let Some(arguments) = node.child_by_field_name("arguments") else {
                continue;
            };
            let mut arg_cursor = arguments.walk();
            let args: Vec<_> = arguments.named_children(&mut arg_cursor).collect();
            calls.push((callee, args));
        }
        calls
    }

    /// Resolves a registration argument to a declaration, following
    /// aliases. For `controller.method` arguments on an instantiated
    /// generic class, also returns the substitution context built from the
    /// instantiation's type arguments.
    fn resolve_handler(
        &self,
        module: ModuleId,
        arg: Node<'a>,
    ) -> Option<(Declaration<'a>, Option<GenericSubstitution<'a>>)> {
        if arg.kind() == "member_expression" {
            let object = arg.child_by_field_name("object")?;
            let property = arg.child_by_field_name("property")?;
            let member = self.model.text(module, property).to_string();

            let object_decl = self.model.resolve_expr(module, object)?;
            let substitution = self.instantiation_substitution(&object_decl);
            let decl = self.model.resolve_member(&object_decl, &member)?;
            return Some((decl, substitution));
        }

        let decl = self.model.resolve_expr(module, arg)?;
        let decl = self.model.alias_of(&decl).unwrap_or(decl);
        Some((decl, None))
    }

    /// Builds the generic-substitution context for a declaration of the
    /// form `const x = new SomeClass<Concrete>()`.
    fn instantiation_substitution(
        &self,
        decl: &Declaration<'a>,
    ) -> Option<GenericSubstitution<'a>> {
        let decl = self.model.alias_of(decl).unwrap_or(*decl);
        if decl.node.kind() != "variable_declarator" {
            return None;
        }
        let value = decl.node.child_by_field_name("value")?;
        if value.kind() != "new_expression" {
            return None;
        }
        let class_decl = self.model.constructor_class(decl.module, value)?;
        let params = self.model.type_parameter_names(&class_decl);
        let args = self.model.new_expression_type_args(decl.module, value);
        if params.is_empty() || args.is_empty() {
            return None;
        }
        Some(params.into_iter().zip(args).collect())
    }
}

/// Appends a path fragment to a prefix and collapses doubled separators.
fn normalize_path(prefix: &str, fragment: &str) -> String {
    let mut path = format!("{}{}", prefix, fragment);
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path
}

/// Merges an extracted handler shape into an endpoint under construction.
fn apply_shape(endpoint: &mut Endpoint, shape: HandlerShape) {
    endpoint.body.extend(shape.body);
    endpoint.query.extend(shape.query);
    endpoint.headers.extend(shape.headers);
    endpoint.response.extend(shape.response);
    if shape.handler_name.is_some() {
        endpoint.handler_name = shape.handler_name;
    }
    if shape.doc_tags.is_some() {
        endpoint.doc_tags = shape.doc_tags;
    }
}
