//! Type-shape resolver: semantic type nodes to [`FieldType`] trees.
//!
//! Free of side effects: purely derives a structural description from the
//! oracle. Resolution rules, in priority order: generic substitution,
//! scalar/primitive, array, object-shaped declaration, enum-shaped
//! declaration; anything else is `None` (unknown shape), never an error.

use crate::endpoint::{FieldKind, FieldType};
use crate::semantic::{Declaration, ModuleId, SemanticModel, TypeRef};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Maps a generic type parameter's name to the concrete type it was
/// instantiated with at a given call site.
pub type GenericSubstitution<'a> = HashMap<String, TypeRef<'a>>;

/// Resolves semantic types into structural field descriptions.
pub struct ShapeResolver<'a> {
    model: &'a SemanticModel,
}

impl<'a> ShapeResolver<'a> {
    pub fn new(model: &'a SemanticModel) -> Self {
        Self { model }
    }

    /// Resolve a type node into a structural shape.
    ///
    /// `substitution` maps generic parameter names to concrete types and is
    /// consulted before anything else. With `expand_child_types` set, named
    /// object-like member types are expanded recursively; without it they
    /// are recorded as a primitive carrying the type name.
    pub fn resolve(
        &self,
        ty: TypeRef<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
        expand_child_types: bool,
    ) -> Option<FieldType> {
        let mut visiting = HashSet::new();
        self.resolve_inner(ty, substitution, expand_child_types, &mut visiting)
    }

    fn resolve_inner(
        &self,
        ty: TypeRef<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
        expand: bool,
        visiting: &mut HashSet<String>,
    ) -> Option<FieldType> {
        let node = unwrap_type(ty.node);
        match node.kind() {
            "predefined_type" => Some(FieldType::primitive(self.model.text(ty.module, node))),
            "literal_type" => {
                let inner = node.named_child(0)?;
                match inner.kind() {
                    "string" => Some(FieldType::literal(self.model.string_value(ty.module, inner))),
                    "number" => Some(FieldType::primitive("number")),
                    _ => Some(FieldType::primitive(self.model.text(ty.module, inner))),
                }
            }
            "array_type" => {
                let element = node.named_child(0).map(|element| {
                    self.resolve_inner(
                        TypeRef {
                            module: ty.module,
                            node: element,
                        },
                        substitution,
                        expand,
                        visiting,
                    )
                });
                Some(FieldType::array(element.flatten()))
            }
            "generic_type" => self.resolve_generic(
                TypeRef {
                    module: ty.module,
                    node,
                },
                substitution,
                expand,
                visiting,
            ),
            "type_identifier" => {
                let name = self.model.text(ty.module, node).to_string();

                // Rule 1: an instantiated generic parameter substitutes
                // before anything else is considered.
                if let Some(concrete) = substitution.and_then(|s| s.get(&name)) {
                    return self.resolve_inner(*concrete, None, expand, visiting);
                }

                // Date-like types are scalars, not objects to expand.
                if name == "Date" {
                    return Some(FieldType::primitive("Date"));
                }

                let decl = self.model.resolve_type_name(ty.module, &name)?;
                self.resolve_declaration(&decl, None, expand, visiting)
            }
            "object_type" => self.object_from_members(ty.module, node, substitution, expand, visiting),
            // Unions and intersections are handled one level up, at the
            // request/response slot; structurally they are unknown here.
            "union_type" | "intersection_type" => None,
            _ => {
                debug!("Unhandled type node kind: {}", node.kind());
                None
            }
        }
    }

    /// `Array<T>` resolves to an array; any other generic reference
    /// resolves its declaration with parameter->argument bindings.
    fn resolve_generic(
        &self,
        ty: TypeRef<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
        expand: bool,
        visiting: &mut HashSet<String>,
    ) -> Option<FieldType> {
        let name_node = ty.node.child_by_field_name("name")?;
        let name = self.model.text(ty.module, name_node).to_string();
        let args = self.model.type_arguments_of(ty);

        if name == "Array" && args.len() == 1 {
            let element = self.resolve_inner(args[0], substitution, expand, visiting);
            return Some(FieldType::array(element));
        }

        // A substituted parameter used with arguments is out of model;
        // fall back to the named declaration.
        let decl = self.model.resolve_type_name(ty.module, &name)?;
        let params = self.model.type_parameter_names(&decl);
        let bindings: GenericSubstitution<'a> = params
            .into_iter()
            .zip(args)
            .map(|(param, arg)| {
                // Arguments that are themselves substituted parameters
                // resolve to their concrete types first.
                let concrete = match arg.node.kind() {
                    "type_identifier" => {
                        let arg_name = self.model.text(arg.module, arg.node);
                        substitution
                            .and_then(|s| s.get(arg_name))
                            .copied()
                            .unwrap_or(arg)
                    }
                    _ => arg,
                };
                (param, concrete)
            })
            .collect();

        let bindings = if bindings.is_empty() {
            None
        } else {
            Some(bindings)
        };
        self.resolve_declaration(&decl, bindings.as_ref(), expand, visiting)
    }

    /// Resolves an interface/type-alias/enum/class declaration.
    fn resolve_declaration(
        &self,
        decl: &Declaration<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
        expand: bool,
        visiting: &mut HashSet<String>,
    ) -> Option<FieldType> {
        let key = match self.model.declared_name(decl) {
            Some(name) => format!("{}:{}", decl.module, name),
            None => format!("{}:{}", decl.module, decl.node.start_byte()),
        };
        if !visiting.insert(key.clone()) {
            warn!("Circular type reference detected: {}", key);
            return None;
        }

        let result = match decl.node.kind() {
            "interface_declaration" => decl.node.child_by_field_name("body").and_then(|body| {
                self.object_from_members(decl.module, body, substitution, expand, visiting)
            }),
            "type_alias_declaration" => decl.node.child_by_field_name("value").and_then(|value| {
                self.resolve_inner(
                    TypeRef {
                        module: decl.module,
                        node: value,
                    },
                    substitution,
                    expand,
                    visiting,
                )
            }),
            "enum_declaration" => self.enum_from_declaration(decl),
            "class_declaration" | "abstract_class_declaration" => {
                decl.node.child_by_field_name("body").and_then(|body| {
                    self.object_from_members(decl.module, body, substitution, expand, visiting)
                })
            }
            _ => None,
        };

        visiting.remove(&key);
        result
    }

    /// Builds an object shape from `property_signature` members (interface
    /// bodies and inline type literals) or typed class fields.
    fn object_from_members(
        &self,
        module: ModuleId,
        body: Node<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
        expand: bool,
        visiting: &mut HashSet<String>,
    ) -> Option<FieldType> {
        let mut properties = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if !matches!(
                member.kind(),
                "property_signature" | "public_field_definition" | "field_definition"
            ) {
                continue;
            }
            let name_node = match member
                .child_by_field_name("name")
                .or_else(|| member.child_by_field_name("property"))
            {
                Some(n) => n,
                None => continue,
            };
            let name = self
                .model
                .text(module, name_node)
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string();

            let optional = has_question_mark(member);
            let resolved = self.member_type(module, member, substitution, expand, visiting);
            properties.push((name, resolved.optional(optional)));
        }
        Some(FieldType::object(properties))
    }

    /// A member's shape; degrades to a primitive carrying the annotation
    /// text when the type cannot be expanded.
    fn member_type(
        &self,
        module: ModuleId,
        member: Node<'a>,
        substitution: Option<&GenericSubstitution<'a>>,
        expand: bool,
        visiting: &mut HashSet<String>,
    ) -> FieldType {
        let annotation = match member.child_by_field_name("type") {
            Some(a) => a,
            None => return FieldType::primitive("any"),
        };
        let ty_node = match annotation.named_child(0) {
            Some(t) => t,
            None => return FieldType::primitive("any"),
        };

        // Without child expansion a named member type stays opaque.
        if !expand && ty_node.kind() == "type_identifier" {
            let name = self.model.text(module, ty_node);
            if name != "Date" {
                return FieldType::primitive(name);
            }
        }

        let ty = TypeRef {
            module,
            node: ty_node,
        };
        self.resolve_inner(ty, substitution, expand, visiting)
            .unwrap_or_else(|| FieldType::primitive(self.model.text(module, ty_node)))
    }

    /// Builds an enum shape; string-initialized members become literals,
    /// auto-numbered members resolve as numbers.
    fn enum_from_declaration(&self, decl: &Declaration<'a>) -> Option<FieldType> {
        let body = decl.node.child_by_field_name("body")?;
        let mut members = Vec::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "enum_assignment" => {
                    let name_node = member.child_by_field_name("name")?;
                    let name = self.model.text(decl.module, name_node).to_string();
                    let value = member.child_by_field_name("value");
                    let ty = match value {
                        Some(v) if v.kind() == "string" => {
                            FieldType::literal(self.model.string_value(decl.module, v))
                        }
                        _ => FieldType::primitive("number"),
                    };
                    members.push((name, ty));
                }
                "property_identifier" => {
                    let name = self.model.text(decl.module, member).to_string();
                    members.push((name, FieldType::primitive("number")));
                }
                _ => {}
            }
        }
        Some(FieldType {
            kind: FieldKind::Enum(members),
            is_optional: false,
        })
    }
}

/// Strips wrappers that carry no shape information of their own.
fn unwrap_type(node: Node) -> Node {
    let mut current = node;
    loop {
        match current.kind() {
            "parenthesized_type" | "type_annotation" => match current.named_child(0) {
                Some(inner) => current = inner,
                None => break,
            },
            _ => break,
        }
    }
    current
}

/// Whether a member carries the `?` optionality marker.
fn has_question_mark(member: Node) -> bool {
    let mut cursor = member.walk();
    let has_marker = member.children(&mut cursor).any(|c| c.kind() == "?");
    has_marker
}
