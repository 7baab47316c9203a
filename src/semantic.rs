//! Semantic model provider: module loading and the symbol/type oracle.
//!
//! The [`SemanticModel`] loads the entry module and everything transitively
//! reachable through relative imports, keeping one tree-sitter syntax tree
//! per file. On top of the trees it exposes the read-only oracle the
//! analysis engine consumes: resolve an expression to its declaration,
//! follow import aliases and re-export chains across files, look up members
//! of classes and object literals, and read attached JSDoc tags.
//!
//! The oracle is structural, not inferential: it follows declarations and
//! annotations but performs no type checking. Absence of information is
//! reported as `None`, never as an error.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// Extensions tried when resolving an import specifier without one.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "mjs", "cjs"];

/// Declaration node kinds that can be found by a top-level name lookup.
const NAMED_DECLARATIONS: &[&str] = &[
    "function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
];

/// Node kinds that denote a function value.
const FUNCTION_KINDS: &[&str] = &["arrow_function", "function_expression", "function"];

/// Index of a loaded module within the model.
pub type ModuleId = usize;

/// A loaded source module: its path, raw text and syntax tree.
pub struct Module {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
}

/// A declaration site: the module it lives in and its syntax node.
///
/// The node may be a definition (`function_declaration`,
/// `variable_declarator`, `method_definition`, ...) or an import binding
/// (`import_specifier`, default-import `identifier`, `namespace_import`)
/// that [`SemanticModel::alias_of`] can follow to the original.
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'a> {
    pub module: ModuleId,
    pub node: Node<'a>,
}

/// A type annotation node located in a specific module.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef<'a> {
    pub module: ModuleId,
    pub node: Node<'a>,
}

/// The loaded program: all reachable modules plus the oracle methods.
pub struct SemanticModel {
    modules: Vec<Module>,
    by_path: HashMap<PathBuf, ModuleId>,
}

impl SemanticModel {
    /// Loads the entry module and its transitive relative-import closure.
    ///
    /// The entry path is resolved to an absolute path first. A failure to
    /// read or parse the entry module is fatal; any other module that
    /// fails logs a warning and is skipped.
    pub fn load(entry: &Path) -> Result<Self> {
        let entry = entry.canonicalize().map_err(|e| Error::LoadError {
            file: entry.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut modules: Vec<Module> = Vec::new();
        let mut by_path: HashMap<PathBuf, ModuleId> = HashMap::new();
        let mut queue: VecDeque<PathBuf> = VecDeque::new();
        queue.push_back(entry.clone());

        while let Some(path) = queue.pop_front() {
            if by_path.contains_key(&path) {
                continue;
            }

            let module = match Self::parse_module(&path) {
                Ok(module) => module,
                Err(e) => {
                    if path == entry {
                        return Err(e);
                    }
                    warn!("Skipping module {}: {}", path.display(), e);
                    continue;
                }
            };

            for spec in collect_import_sources(&module) {
                if let Some(target) = resolve_import(&path, &spec) {
                    if !by_path.contains_key(&target) {
                        queue.push_back(target);
                    }
                } else {
                    debug!("Unresolved import '{}' in {}", spec, path.display());
                }
            }

            by_path.insert(path, modules.len());
            modules.push(module);
        }

        debug!("Loaded {} modules", modules.len());
        Ok(SemanticModel { modules, by_path })
    }

    fn parse_module(path: &Path) -> Result<Module> {
        debug!("Loading module: {}", path.display());
        let source = fs::read_to_string(path).map_err(|e| Error::LoadError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let language = match path.extension().and_then(|s| s.to_str()) {
            Some("tsx") => tree_sitter_typescript::LANGUAGE_TSX,
            _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
        };

        let mut parser = Parser::new();
        parser
            .set_language(&language.into())
            .map_err(|e| Error::LoadError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let tree = parser.parse(&source, None).ok_or_else(|| Error::LoadError {
            file: path.to_path_buf(),
            message: "parser produced no tree".to_string(),
        })?;

        Ok(Module {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }

    /// The entry module is always loaded first.
    pub fn entry(&self) -> ModuleId {
        0
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn root(&self, id: ModuleId) -> Node<'_> {
        self.modules[id].tree.root_node()
    }

    /// Source text of a node.
    pub fn text(&self, id: ModuleId, node: Node) -> &str {
        node.utf8_text(self.modules[id].source.as_bytes())
            .unwrap_or("")
    }

    /// Text of a string literal node with the surrounding quotes stripped.
    pub fn string_value(&self, id: ModuleId, node: Node) -> String {
        self.text(id, node)
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string()
    }

    /// Resolves an argument expression to its declaration. Handles bare
    /// identifiers, `object.member` accesses (including namespace imports)
    /// and the usual transparent wrappers.
    pub fn resolve_expr<'a>(&'a self, id: ModuleId, expr: Node<'a>) -> Option<Declaration<'a>> {
        let expr = unwrap_expression(expr);
        match expr.kind() {
            "identifier" => {
                let name = self.text(id, expr).to_string();
                self.resolve_symbol(id, &name)
            }
            "member_expression" => {
                let object = expr.child_by_field_name("object")?;
                let property = expr.child_by_field_name("property")?;
                let member = self.text(id, property).to_string();
                let object_decl = self.resolve_expr(id, object)?;
                self.resolve_member(&object_decl, &member)
            }
            _ => None,
        }
    }

    /// Looks a name up among the module's top-level declarations and import
    /// bindings. Import bindings are returned as-is; callers follow them
    /// with [`alias_of`](Self::alias_of) when they need the original.
    pub fn resolve_symbol<'a>(&'a self, id: ModuleId, name: &str) -> Option<Declaration<'a>> {
        let root = self.root(id);
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            // `export const x = ...` wraps the declaration one level down.
            let candidate = if statement.kind() == "export_statement" {
                match statement.child_by_field_name("declaration") {
                    Some(decl) => decl,
                    None => continue,
                }
            } else {
                statement
            };

            if NAMED_DECLARATIONS.contains(&candidate.kind()) {
                if let Some(found) = self.match_decl_name(id, candidate, name) {
                    return Some(found);
                }
            }

            match candidate.kind() {
                "lexical_declaration" | "variable_declaration" => {
                    let mut inner = candidate.walk();
                    for declarator in candidate.named_children(&mut inner) {
                        if declarator.kind() != "variable_declarator" {
                            continue;
                        }
                        if let Some(found) = self.match_decl_name(id, declarator, name) {
                            return Some(found);
                        }
                    }
                }
                "import_statement" => {
                    if let Some(binding) = self.find_import_binding(id, candidate, name) {
                        return Some(binding);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn match_decl_name<'a>(
        &'a self,
        id: ModuleId,
        node: Node<'a>,
        name: &str,
    ) -> Option<Declaration<'a>> {
        let name_node = node.child_by_field_name("name")?;
        if self.text(id, name_node) == name {
            Some(Declaration { module: id, node })
        } else {
            None
        }
    }

    /// Finds the binding node for `name` inside an `import_statement`.
    fn find_import_binding<'a>(
        &'a self,
        id: ModuleId,
        import: Node<'a>,
        name: &str,
    ) -> Option<Declaration<'a>> {
        let mut cursor = import.walk();
        for clause in import.named_children(&mut cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut inner = clause.walk();
            for binding in clause.named_children(&mut inner) {
                match binding.kind() {
                    // `import auth from './auth'`
                    "identifier" if self.text(id, binding) == name => {
                        return Some(Declaration {
                            module: id,
                            node: binding,
                        });
                    }
                    // `import * as auth from './auth'`
                    "namespace_import" => {
                        let local = binding.named_child(0)?;
                        if self.text(id, local) == name {
                            return Some(Declaration {
                                module: id,
                                node: binding,
                            });
                        }
                    }
                    // `import { login, logout as exit } from './auth'`
                    "named_imports" => {
                        let mut specs = binding.walk();
                        for spec in binding.named_children(&mut specs) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let local = spec
                                .child_by_field_name("alias")
                                .or_else(|| spec.child_by_field_name("name"))?;
                            if self.text(id, local) == name {
                                return Some(Declaration {
                                    module: id,
                                    node: spec,
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }

    /// Follows an import binding (or a re-export chain) to the original
    /// declaration in its defining module. Returns `None` when the
    /// declaration is not an alias or the target cannot be located.
    pub fn alias_of<'a>(&'a self, decl: &Declaration<'a>) -> Option<Declaration<'a>> {
        self.alias_of_depth(decl, 0)
    }

    fn alias_of_depth<'a>(&'a self, decl: &Declaration<'a>, depth: usize) -> Option<Declaration<'a>> {
        if depth > 16 {
            warn!("Alias chain too deep, giving up");
            return None;
        }
        match decl.node.kind() {
            "import_specifier" => {
                let imported = decl.node.child_by_field_name("name")?;
                let name = self.text(decl.module, imported).to_string();
                let target = self.import_target(decl.module, decl.node)?;
                self.resolve_export(target, &name, depth + 1)
            }
            "identifier" => {
                // A default-import binding (`import auth from './auth'`).
                let target = self.import_target(decl.module, decl.node)?;
                self.resolve_default_export(target)
            }
            "namespace_import" => {
                // The namespace stands for the whole target module.
                let target = self.import_target(decl.module, decl.node)?;
                Some(Declaration {
                    module: target,
                    node: self.root(target),
                })
            }
            _ => None,
        }
    }

    /// Module a binding's enclosing `import_statement` points at.
    fn import_target(&self, id: ModuleId, binding: Node) -> Option<ModuleId> {
        let mut node = binding;
        while node.kind() != "import_statement" {
            node = node.parent()?;
        }
        let source = node.child_by_field_name("source")?;
        let spec = self.string_value(id, source);
        let target = resolve_import(&self.modules[id].path, &spec)?;
        self.by_path.get(&target).copied()
    }

    /// Locates the declaration exported from `module` under `name`,
    /// following `export { x } from './y'` chains.
    fn resolve_export<'a>(
        &'a self,
        id: ModuleId,
        name: &str,
        depth: usize,
    ) -> Option<Declaration<'a>> {
        // Re-export chains are expected to be short; the guard only
        // protects against a malformed circular export.
        if depth > 16 {
            warn!("Re-export chain too deep while resolving '{}'", name);
            return None;
        }

        let root = self.root(id);
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            if statement.kind() != "export_statement" {
                continue;
            }
            let source_module = statement
                .child_by_field_name("source")
                .map(|s| self.string_value(id, s))
                .and_then(|spec| resolve_import(&self.modules[id].path, &spec))
                .and_then(|p| self.by_path.get(&p).copied());

            let mut inner = statement.walk();
            for child in statement.named_children(&mut inner) {
                if child.kind() != "export_clause" {
                    continue;
                }
                let mut specs = child.walk();
                for spec in child.named_children(&mut specs) {
                    if spec.kind() != "export_specifier" {
                        continue;
                    }
                    let exported = spec
                        .child_by_field_name("alias")
                        .or_else(|| spec.child_by_field_name("name"))?;
                    if self.text(id, exported) != name {
                        continue;
                    }
                    let original = spec.child_by_field_name("name")?;
                    let original_name = self.text(id, original).to_string();
                    return match source_module {
                        Some(target) => self.resolve_export(target, &original_name, depth + 1),
                        None => {
                            let local = self.resolve_symbol(id, &original_name)?;
                            Some(self.alias_of_depth(&local, depth + 1).unwrap_or(local))
                        }
                    };
                }
            }
        }

        // `export const name = ...` and friends are found by the plain
        // symbol lookup, which already looks through export statements.
        let local = self.resolve_symbol(id, name)?;
        Some(self.alias_of_depth(&local, depth + 1).unwrap_or(local))
    }

    /// Locates a module's `export default` declaration.
    fn resolve_default_export(&self, id: ModuleId) -> Option<Declaration<'_>> {
        let root = self.root(id);
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            if statement.kind() != "export_statement" {
                continue;
            }
            let has_default = (0..statement.child_count())
                .filter_map(|i| statement.child(i))
                .any(|c| c.kind() == "default");
            if !has_default {
                continue;
            }
            let value = statement
                .child_by_field_name("value")
                .or_else(|| statement.child_by_field_name("declaration"))
                .or_else(|| statement.named_child(statement.named_child_count().saturating_sub(1)));
            let value = unwrap_expression(value?);
            if value.kind() == "identifier" {
                let name = self.text(id, value).to_string();
                let local = self.resolve_symbol(id, &name)?;
                return Some(self.alias_of(&local).unwrap_or(local));
            }
            return Some(Declaration {
                module: id,
                node: value,
            });
        }
        None
    }

    /// Looks `member` up on a resolved declaration: class members, object
    /// literal properties, namespace imports and controller instances.
    pub fn resolve_member<'a>(
        &'a self,
        decl: &Declaration<'a>,
        member: &str,
    ) -> Option<Declaration<'a>> {
        match decl.node.kind() {
            "namespace_import" => {
                let target = self.import_target(decl.module, decl.node)?;
                self.resolve_export(target, member, 0)
            }
            "import_specifier" | "identifier" => {
                let original = self.alias_of(decl)?;
                self.resolve_member(&original, member)
            }
            "variable_declarator" => {
                let value = unwrap_expression(decl.node.child_by_field_name("value")?);
                match value.kind() {
                    "object" => self.find_object_member(decl.module, value, member),
                    "new_expression" => {
                        let class_decl = self.constructor_class(decl.module, value)?;
                        self.resolve_member(&class_decl, member)
                    }
                    _ => None,
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                let body = decl.node.child_by_field_name("body")?;
                self.find_class_member(decl.module, body, member)
            }
            _ => None,
        }
    }

    fn find_object_member<'a>(
        &'a self,
        id: ModuleId,
        object: Node<'a>,
        member: &str,
    ) -> Option<Declaration<'a>> {
        let mut cursor = object.walk();
        for pair in object.named_children(&mut cursor) {
            if pair.kind() != "pair" {
                continue;
            }
            let key = pair.child_by_field_name("key")?;
            if self.text(id, key).trim_matches(|c| c == '"' || c == '\'') == member {
                return Some(Declaration {
                    module: id,
                    node: pair,
                });
            }
        }
        None
    }

    fn find_class_member<'a>(
        &'a self,
        id: ModuleId,
        body: Node<'a>,
        member: &str,
    ) -> Option<Declaration<'a>> {
        let mut cursor = body.walk();
        for item in body.named_children(&mut cursor) {
            match item.kind() {
                "method_definition" | "public_field_definition" | "field_definition" => {
                    let name = item
                        .child_by_field_name("name")
                        .or_else(|| item.child_by_field_name("property"))?;
                    if self.text(id, name) == member {
                        return Some(Declaration {
                            module: id,
                            node: item,
                        });
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// The class a `new` expression instantiates, following aliases.
    pub fn constructor_class<'a>(
        &'a self,
        id: ModuleId,
        new_expr: Node<'a>,
    ) -> Option<Declaration<'a>> {
        let constructor = new_expr.child_by_field_name("constructor")?;
        let decl = self.resolve_expr(id, constructor)?;
        let decl = self.alias_of(&decl).unwrap_or(decl);
        if matches!(
            decl.node.kind(),
            "class_declaration" | "abstract_class_declaration"
        ) {
            Some(decl)
        } else {
            None
        }
    }

    /// Type arguments of a `new Controller<T>()` expression, if any.
    pub fn new_expression_type_args<'a>(
        &'a self,
        id: ModuleId,
        new_expr: Node<'a>,
    ) -> Vec<TypeRef<'a>> {
        let mut args = Vec::new();
        let mut cursor = new_expr.walk();
        for child in new_expr.children(&mut cursor) {
            if child.kind() == "type_arguments" {
                let mut inner = child.walk();
                for arg in child.named_children(&mut inner) {
                    args.push(TypeRef {
                        module: id,
                        node: arg,
                    });
                }
            }
        }
        args
    }

    /// Names of a class declaration's generic type parameters.
    pub fn type_parameter_names(&self, decl: &Declaration) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = decl.node.walk();
        for child in decl.node.children(&mut cursor) {
            if child.kind() == "type_parameters" {
                let mut inner = child.walk();
                for param in child.named_children(&mut inner) {
                    if param.kind() == "type_parameter" {
                        if let Some(name) = param.child_by_field_name("name") {
                            names.push(self.text(decl.module, name).to_string());
                        }
                    }
                }
            }
        }
        names
    }

    /// The function value behind a declaration, when it has one that can be
    /// inspected directly.
    pub fn function_node<'a>(&'a self, decl: &Declaration<'a>) -> Option<Node<'a>> {
        let node = decl.node;
        match node.kind() {
            "function_declaration" | "method_definition" => Some(node),
            k if FUNCTION_KINDS.contains(&k) => Some(node),
            "variable_declarator" | "pair" | "public_field_definition" | "field_definition" => {
                let value = node
                    .child_by_field_name("value")
                    .map(unwrap_expression)?;
                if FUNCTION_KINDS.contains(&value.kind()) {
                    Some(value)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Formal parameters of a function node, in order. The single
    /// paren-less arrow parameter is returned as a one-element list.
    pub fn params_of<'a>(&'a self, fn_node: Node<'a>) -> Vec<Node<'a>> {
        if let Some(parameters) = fn_node.child_by_field_name("parameters") {
            let mut cursor = parameters.walk();
            return parameters
                .named_children(&mut cursor)
                .filter(|p| {
                    matches!(
                        p.kind(),
                        "required_parameter" | "optional_parameter" | "identifier"
                    )
                })
                .collect();
        }
        if let Some(single) = fn_node.child_by_field_name("parameter") {
            return vec![single];
        }
        Vec::new()
    }

    /// The identifier name a parameter binds, if it is a plain binding.
    pub fn param_name(&self, id: ModuleId, param: Node) -> Option<String> {
        let pattern = if param.kind() == "identifier" {
            param
        } else {
            param.child_by_field_name("pattern")?
        };
        if pattern.kind() == "identifier" {
            Some(self.text(id, pattern).to_string())
        } else {
            None
        }
    }

    /// The annotated type of a parameter, unwrapped from its annotation.
    pub fn param_type<'a>(&'a self, id: ModuleId, param: Node<'a>) -> Option<TypeRef<'a>> {
        let annotation = param.child_by_field_name("type")?;
        let ty = annotation.named_child(0)?;
        Some(TypeRef {
            module: id,
            node: ty,
        })
    }

    /// Generic type arguments of a type node (`Typed<A, B, C>` -> `[A, B, C]`).
    pub fn type_arguments_of<'a>(&'a self, ty: TypeRef<'a>) -> Vec<TypeRef<'a>> {
        let mut args = Vec::new();
        if ty.node.kind() != "generic_type" {
            return args;
        }
        let mut cursor = ty.node.walk();
        for child in ty.node.children(&mut cursor) {
            if child.kind() == "type_arguments" {
                let mut inner = child.walk();
                for arg in child.named_children(&mut inner) {
                    args.push(TypeRef {
                        module: ty.module,
                        node: arg,
                    });
                }
            }
        }
        args
    }

    /// Resolves a type name to its declaration (interface, type alias,
    /// enum or class), following import aliases.
    pub fn resolve_type_name<'a>(&'a self, id: ModuleId, name: &str) -> Option<Declaration<'a>> {
        let decl = self.resolve_symbol(id, name)?;
        let decl = self.alias_of(&decl).unwrap_or(decl);
        if matches!(
            decl.node.kind(),
            "interface_declaration"
                | "type_alias_declaration"
                | "enum_declaration"
                | "class_declaration"
                | "abstract_class_declaration"
        ) {
            Some(decl)
        } else {
            None
        }
    }

    /// The declared name of a handler, when its declaration carries one.
    pub fn declared_name(&self, decl: &Declaration) -> Option<String> {
        let name_node = match decl.node.kind() {
            "function_declaration"
            | "method_definition"
            | "variable_declarator"
            | "class_declaration"
            | "abstract_class_declaration"
            | "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration" => decl.node.child_by_field_name("name"),
            "public_field_definition" | "field_definition" => decl
                .node
                .child_by_field_name("name")
                .or_else(|| decl.node.child_by_field_name("property")),
            "pair" => decl.node.child_by_field_name("key"),
            _ => None,
        }?;
        let name = self
            .text(decl.module, name_node)
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// JSDoc tags attached to a declaration, as tag name -> text.
    /// Returns `None` when no documentation block with tags precedes it.
    pub fn doc_tags_of(&self, decl: &Declaration) -> Option<BTreeMap<String, String>> {
        // The comment sits before the outermost statement the declaration
        // belongs to (export/lexical wrappers included).
        let mut node = decl.node;
        while let Some(parent) = node.parent() {
            if matches!(
                parent.kind(),
                "lexical_declaration" | "variable_declaration" | "export_statement"
            ) {
                node = parent;
            } else {
                break;
            }
        }

        // Only a directly adjacent documentation block counts.
        let sibling = node.prev_sibling()?;
        if sibling.kind() != "comment" {
            return None;
        }
        let text = self.text(decl.module, sibling);
        if !text.starts_with("/**") {
            return None;
        }

        let tags = parse_doc_tags(text);
        if tags.is_empty() {
            None
        } else {
            Some(tags)
        }
    }
}

/// Strips transparent wrappers (parentheses, `as` casts, `!` assertions,
/// `await`) off an expression node.
fn unwrap_expression(node: Node) -> Node {
    let mut current = node;
    loop {
        match current.kind() {
            "parenthesized_expression" | "await_expression" => {
                match current
                    .child_by_field_name("expression")
                    .or_else(|| current.named_child(0))
                {
                    Some(inner) => current = inner,
                    None => break,
                }
            }
            "as_expression" | "satisfies_expression" | "non_null_expression" => {
                match current.named_child(0) {
                    Some(inner) => current = inner,
                    None => break,
                }
            }
            _ => break,
        }
    }
    current
}

/// Parses `@tag text` lines out of a `/** ... */` block.
fn parse_doc_tags(comment: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for line in comment.lines() {
        let line = line
            .trim()
            .trim_start_matches("/**")
            .trim_end_matches("*/")
            .trim_start_matches('*')
            .trim();
        if !line.starts_with('@') {
            continue;
        }
        let rest = &line[1..];
        let (name, text) = match rest.split_once(char::is_whitespace) {
            Some((name, text)) => (name, text.trim()),
            None => (rest, ""),
        };
        if !name.is_empty() {
            tags.insert(name.to_string(), text.to_string());
        }
    }
    tags
}

/// Collects every import specifier a module mentions: `import ... from`,
/// `export ... from`, and `require("...")` calls.
fn collect_import_sources(module: &Module) -> Vec<String> {
    let mut sources = Vec::new();
    let mut stack = vec![module.tree.root_node()];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" | "export_statement" => {
                if let Some(source) = node.child_by_field_name("source") {
                    let spec = source
                        .utf8_text(module.source.as_bytes())
                        .unwrap_or("")
                        .trim_matches(|c| c == '"' || c == '\'' || c == '`');
                    if !spec.is_empty() {
                        sources.push(spec.to_string());
                    }
                }
            }
            "call_expression" => {
                let is_require = node
                    .child_by_field_name("function")
                    .map(|f| f.utf8_text(module.source.as_bytes()).unwrap_or("") == "require")
                    .unwrap_or(false);
                if is_require {
                    if let Some(args) = node.child_by_field_name("arguments") {
                        if let Some(arg) = args.named_child(0) {
                            if arg.kind() == "string" {
                                let spec = arg
                                    .utf8_text(module.source.as_bytes())
                                    .unwrap_or("")
                                    .trim_matches(|c| c == '"' || c == '\'' || c == '`');
                                if !spec.is_empty() {
                                    sources.push(spec.to_string());
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            stack.push(child);
        }
    }
    sources
}

/// Resolves a relative import specifier against the importing file.
///
/// Tries the literal path, then the candidate extensions, then
/// `index.<ext>` inside a directory. Bare (package) specifiers resolve to
/// `None`; external dependencies are not analyzable.
fn resolve_import(importer: &Path, spec: &str) -> Option<PathBuf> {
    if !spec.starts_with("./") && !spec.starts_with("../") {
        return None;
    }
    let base = importer.parent().unwrap_or_else(|| Path::new(""));
    let joined = base.join(spec);

    if joined.is_file() {
        return joined.canonicalize().ok();
    }
    for ext in SOURCE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", joined.display(), ext));
        if candidate.is_file() {
            return candidate.canonicalize().ok();
        }
    }
    for ext in SOURCE_EXTENSIONS {
        let candidate = joined.join(format!("index.{}", ext));
        if candidate.is_file() {
            return candidate.canonicalize().ok();
        }
    }
    None
}
