//! Passes 3-5 bundled: one tree walk per file producing
//! CALLS, USAGE, USES_TYPE, THROWS/RAISES and CONFIGURES edges together.
//! Every rule here reads the frozen registry/import map/type map through
//! [`ResolveCtx`] and returns `ResolvedEdge`s; nothing is written to the
//! store from this module.

use std::collections::HashSet;

use tree_sitter::{Node, Tree};

use crate::application::ports::ResolveCtx;
use crate::domain::language_spec::LanguageSpec;
use crate::domain::{nested_qualified_name, EdgeType, Language, ResolvedEdge};

use super::extract::{extract_param_types, extract_return_types, is_class_like_kind, is_function_like};
use super::walk::{all_descendants, declaration_name, field_path, find_descendant, first_field, text};

const SKIP_IDENTIFIERS: &[&str] = &["self", "this", "err", "ok", "ctx", "cls", "super", "nil", "null", "true", "false"];

pub fn resolve_generic(spec: &'static LanguageSpec, ctx: &ResolveCtx, source: &[u8], tree: &Tree) -> Vec<ResolvedEdge> {
    let mut edges = Vec::new();
    let root = tree.root_node();

    resolve_calls(spec, ctx, source, root, &mut edges);
    resolve_usage(spec, ctx, source, root, &mut edges);
    resolve_uses_type(spec, ctx, source, root, &mut edges);
    resolve_throws(spec, ctx, source, root, &mut edges);
    resolve_configures(spec, ctx, source, root, &mut edges);

    edges
}

/// Nearest enclosing function/method's qualified name, rebuilt by walking
/// tree ancestry the same way pass 1 derives QNs: only class-like ancestors
/// extend the container chain, function-like ancestors are leaves.
/// Falls back to the module QN for top-level references.
fn enclosing_qn(spec: &LanguageSpec, node: Node, module_qn: &str, source: &[u8]) -> String {
    let mut current = Some(node);
    while let Some(n) = current {
        if is_function_like(spec, n.kind()) {
            if let Some(name) = declaration_name(n, source) {
                let class_qn = class_chain_qn(spec, n, module_qn, source);
                return nested_qualified_name(&class_qn, name);
            }
        }
        current = n.parent();
    }
    module_qn.to_string()
}

fn class_chain_qn(spec: &LanguageSpec, start: Node, module_qn: &str, source: &[u8]) -> String {
    let mut names = Vec::new();
    let mut current = start.parent();
    while let Some(n) = current {
        if is_class_like_kind(spec, n.kind()) {
            if let Some(name) = declaration_name(n, source) {
                names.push(name.to_string());
            }
        }
        current = n.parent();
    }
    names.reverse();
    let mut qn = module_qn.to_string();
    for name in names {
        qn = nested_qualified_name(&qn, &name);
    }
    qn
}

fn has_ancestor_kind(node: Node, kinds: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return true;
        }
        current = n.parent();
    }
    false
}

fn is_name_field_of_definition(node: Node) -> bool {
    let Some(parent) = node.parent() else { return false };
    parent.child_by_field_name("name") == Some(node)
}

// ---------------------------------------------------------------- CALLS

fn resolve_calls(spec: &'static LanguageSpec, ctx: &ResolveCtx, source: &[u8], root: Node, out: &mut Vec<ResolvedEdge>) {
    let mut calls = Vec::new();
    all_descendants(root, spec.call_node_types, &mut calls);

    for call in calls {
        let Some(callee_node) = callee_node(spec, call) else { continue };
        let callee_text = text(callee_node, source);
        if callee_text.is_empty() {
            continue;
        }
        let caller_qn = enclosing_qn(spec, call, ctx.module_qn, source);

        let target_qn = resolve_callee(spec, ctx, callee_text, call, source);
        let Some(target_qn) = target_qn else { continue };
        if target_qn == caller_qn {
            continue;
        }
        out.push(ResolvedEdge::new(caller_qn, target_qn, EdgeType::Calls));
    }
}

fn callee_node<'a>(spec: &LanguageSpec, call: Node<'a>) -> Option<Node<'a>> {
    if let Some(f) = call.child_by_field_name("function") {
        return Some(f);
    }
    if let Some(f) = call.child_by_field_name("macro") {
        return Some(f);
    }
    match call.kind() {
        "method_invocation" => {
            // Java: object + name fields; resolving on "name" alone is
            // enough for same-class calls, dotted cross-class calls go
            // through the `object` text as the receiver below.
            call.child_by_field_name("name")
        }
        "object_creation_expression" => call.child_by_field_name("type"),
        _ => {
            let _ = spec;
            None
        }
    }
}

fn resolve_callee(spec: &LanguageSpec, ctx: &ResolveCtx, callee_text: &str, call: Node, source: &[u8]) -> Option<String> {
    if let Some((receiver, method)) = callee_text.rsplit_once('.') {
        let receiver_name = receiver.rsplit(['.', ')']).next().unwrap_or(receiver).trim_start_matches('*');

        if let Some(class_name) = ctx.type_map.get(receiver_name) {
            if let Some(class_qn) = ctx.registry.resolve_as_class(class_name, ctx.module_qn, ctx.import_map) {
                let candidate = format!("{class_qn}.{method}");
                if ctx.registry.find_exact(&candidate).is_some() {
                    return Some(candidate);
                }
            }
        }

        if spec.language == Language::Go {
            if let Some((var_name, type_name)) = go_enclosing_receiver(spec, call, source) {
                if var_name == receiver_name {
                    if let Some(class_qn) = ctx.registry.resolve_as_class(&type_name, ctx.module_qn, ctx.import_map) {
                        let candidate = format!("{class_qn}.{method}");
                        if ctx.registry.find_exact(&candidate).is_some() {
                            return Some(candidate);
                        }
                    }
                }
            }
        }
    }

    ctx.registry.resolve(callee_text, ctx.module_qn, ctx.import_map)
}

/// Parses the Go receiver field of the method enclosing `node`, if any,
/// into `(variable_name, type_name)`.
fn go_enclosing_receiver(spec: &LanguageSpec, node: Node, source: &[u8]) -> Option<(String, String)> {
    let mut current = Some(node);
    while let Some(n) = current {
        if n.kind() == "method_declaration" {
            let receiver = n.child_by_field_name("receiver")?;
            let param = receiver.named_child(0)?;
            let var_name = param.child_by_field_name("name").map(|x| text(x, source).to_string())?;
            let type_node = param.child_by_field_name("type")?;
            let type_name = text(type_node, source).trim_start_matches('*').to_string();
            return Some((var_name, type_name));
        }
        if is_function_like(spec, n.kind()) {
            return None;
        }
        current = n.parent();
    }
    None
}

// ---------------------------------------------------------------- USAGE

const USAGE_NODE_KINDS: &[&str] = &[
    "identifier",
    "selector_expression",
    "attribute",
    "member_expression",
    "field_access",
    "name",
    "scoped_identifier",
    "simple_identifier",
];

fn resolve_usage(spec: &'static LanguageSpec, ctx: &ResolveCtx, source: &[u8], root: Node, out: &mut Vec<ResolvedEdge>) {
    let mut candidates = Vec::new();
    all_descendants(root, USAGE_NODE_KINDS, &mut candidates);

    for node in candidates {
        if has_ancestor_kind(node, spec.call_node_types) {
            continue;
        }
        if has_ancestor_kind(node, spec.import_node_types) || has_ancestor_kind(node, spec.import_from_types) {
            continue;
        }
        if is_name_field_of_definition(node) {
            continue;
        }
        let raw = text(node, source);
        let simple = raw.rsplit('.').next().unwrap_or(raw);
        if simple.len() <= 1 || SKIP_IDENTIFIERS.contains(&simple) || spec.builtin_types.contains(&raw) {
            continue;
        }

        let caller_qn = enclosing_qn(spec, node, ctx.module_qn, source);
        let Some(target_qn) = ctx.registry.resolve(raw, ctx.module_qn, ctx.import_map) else { continue };
        if target_qn == caller_qn {
            continue;
        }
        out.push(ResolvedEdge::new(caller_qn, target_qn, EdgeType::Usage));
    }
}

// ------------------------------------------------------------ USES_TYPE

fn resolve_uses_type(spec: &'static LanguageSpec, ctx: &ResolveCtx, source: &[u8], root: Node, out: &mut Vec<ResolvedEdge>) {
    let mut dedup = HashSet::new();
    let mut functions = Vec::new();
    all_descendants(root, spec.function_node_types, &mut functions);
    all_descendants(root, spec.method_node_types, &mut functions);

    for func in &functions {
        let Some(name) = declaration_name(*func, source) else { continue };
        let class_qn = class_chain_qn(spec, *func, ctx.module_qn, source);
        let func_qn = nested_qualified_name(&class_qn, name);

        let mut type_names = Vec::new();
        if let Some(params) = first_field(*func, spec.param_list_fields) {
            type_names.extend(extract_param_types(spec, params, source));
        }
        type_names.extend(extract_return_types(spec, *func, source));

        for type_name in type_names {
            emit_uses_type(ctx, &func_qn, &type_name, &mut dedup, out);
        }
    }

    body_type_references(spec, ctx, source, root, &mut dedup, out);
}

fn emit_uses_type(ctx: &ResolveCtx, func_qn: &str, type_name: &str, dedup: &mut HashSet<(String, String)>, out: &mut Vec<ResolvedEdge>) {
    let Some(type_qn) = ctx.registry.resolve_as_class(type_name, ctx.module_qn, ctx.import_map) else { return };
    if !dedup.insert((func_qn.to_string(), type_qn.clone())) {
        return;
    }
    out.push(ResolvedEdge::new(func_qn, type_qn, EdgeType::UsesType));
}

fn body_type_references(
    spec: &'static LanguageSpec,
    ctx: &ResolveCtx,
    source: &[u8],
    root: Node,
    dedup: &mut HashSet<(String, String)>,
    out: &mut Vec<ResolvedEdge>,
) {
    let kinds: &[&str] = match spec.language {
        Language::Go => &["var_spec", "type_assertion_expression", "type_conversion_expression", "composite_literal"],
        Language::TypeScript => &["variable_declarator", "as_expression", "satisfies_expression"],
        Language::Java => &["local_variable_declaration", "cast_expression"],
        Language::Python => &["assignment"],
        Language::Rust => &["let_declaration", "type_cast_expression"],
        _ => &[],
    };
    if kinds.is_empty() {
        return;
    }
    let mut nodes = Vec::new();
    all_descendants(root, kinds, &mut nodes);

    for node in nodes {
        let type_node = match spec.language {
            Language::Go => node
                .child_by_field_name("type")
                .or_else(|| node.child_by_field_name("type"))
                .or_else(|| find_descendant(node, &["type_identifier"])),
            Language::TypeScript => node
                .child_by_field_name("type")
                .and_then(|t| find_descendant(t, &["type_identifier"])),
            Language::Java => find_descendant(node, &["type_identifier", "generic_type"]),
            Language::Python => node
                .child_by_field_name("type")
                .and_then(|t| find_descendant(t, &["identifier"])),
            Language::Rust => node
                .child_by_field_name("type")
                .and_then(|t| find_descendant(t, &["type_identifier"])),
            _ => None,
        };
        let Some(type_node) = type_node else { continue };
        let type_name = super::walk::clean_type(text(type_node, source));
        if type_name.is_empty() || spec.builtin_types.contains(&type_name.as_str()) {
            continue;
        }
        let func_qn = enclosing_qn(spec, node, ctx.module_qn, source);
        emit_uses_type(ctx, &func_qn, &type_name, dedup, out);
    }
}

// --------------------------------------------------------- THROWS/RAISES

fn resolve_throws(spec: &'static LanguageSpec, ctx: &ResolveCtx, source: &[u8], root: Node, out: &mut Vec<ResolvedEdge>) {
    let mut functions = Vec::new();
    all_descendants(root, spec.function_node_types, &mut functions);
    all_descendants(root, spec.method_node_types, &mut functions);

    for func in functions {
        let Some(name) = declaration_name(func, source) else { continue };
        let class_qn = class_chain_qn(spec, func, ctx.module_qn, source);
        let func_qn = nested_qualified_name(&class_qn, name);

        if let Some(field) = spec.throws_clause_field {
            if let Some(clause) = func.child_by_field_name(field) {
                let mut cursor = clause.walk();
                for child in clause.named_children(&mut cursor) {
                    let name = text(child, source);
                    if let Some(target) = ctx.registry.resolve_as_class(name, ctx.module_qn, ctx.import_map) {
                        out.push(
                            ResolvedEdge::new(func_qn.clone(), target, EdgeType::Throws)
                                .with_property("declared", serde_json::json!(true)),
                        );
                    }
                }
            }
        }

        let Some(body) = first_field(func, &["body", "block"]).or_else(|| find_descendant(func, &["function_body"])) else {
            continue;
        };
        let mut throw_nodes = Vec::new();
        all_descendants(body, spec.throw_node_types, &mut throw_nodes);
        for throw_node in throw_nodes {
            let Some(exc_name) = exception_name(throw_node, source) else { continue };
            let Some(target) = ctx.registry.resolve_as_class(&exc_name, ctx.module_qn, ctx.import_map) else { continue };
            out.push(
                ResolvedEdge::new(func_qn.clone(), target, EdgeType::Raises)
                    .with_property("declared", serde_json::json!(false)),
            );
        }
    }
}

fn exception_name(node: Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "new_expression" | "object_creation_expression" => {
                let target = child
                    .child_by_field_name("type")
                    .or_else(|| child.named_child(0))?;
                return Some(text(target, source).to_string());
            }
            "instance_expression" => {
                return find_descendant(child, &["type_identifier"]).map(|t| text(t, source).to_string());
            }
            "call" | "call_expression" => {
                let callee = child.child_by_field_name("function")?;
                let callee_text = text(callee, source);
                return Some(callee_text.rsplit('.').next().unwrap_or(callee_text).to_string());
            }
            "identifier" | "type_identifier" | "name" => {
                return Some(text(child, source).to_string());
            }
            _ => {
                if let Some(found) = exception_name(child, source) {
                    return Some(found);
                }
            }
        }
    }
    None
}

// ------------------------------------------------------------ CONFIGURES

fn resolve_configures(spec: &'static LanguageSpec, ctx: &ResolveCtx, source: &[u8], root: Node, out: &mut Vec<ResolvedEdge>) {
    let mut dedup = HashSet::new();

    if !spec.env_access_functions.is_empty() {
        let mut calls = Vec::new();
        all_descendants(root, spec.call_node_types, &mut calls);
        for call in calls {
            let Some(callee) = call.child_by_field_name("function") else { continue };
            let callee_text = text(callee, source);
            if !spec.env_access_functions.contains(&callee_text) {
                continue;
            }
            let Some(args) = call.child_by_field_name("arguments") else { continue };
            let Some(first_arg) = args.named_child(0) else { continue };
            let key = text(first_arg, source).trim_matches(|c| c == '"' || c == '\'').to_string();
            emit_configures(ctx, spec, call, &key, source, &mut dedup, out);
        }
    }

    if !spec.env_access_member_patterns.is_empty() {
        let mut members = Vec::new();
        all_descendants(
            root,
            &["selector_expression", "member_expression", "subscript_expression", "index_expression", "attribute"],
            &mut members,
        );
        for member in members {
            let raw = text(member, source);
            for pattern in spec.env_access_member_patterns {
                let dotted = format!("{pattern}.");
                if let Some(rest) = raw.strip_prefix(dotted.as_str()) {
                    emit_configures(ctx, spec, member, rest, source, &mut dedup, out);
                    break;
                }
                let bracketed = format!("{pattern}[");
                if let Some(rest) = raw.strip_prefix(bracketed.as_str()) {
                    let key = rest.trim_end_matches(']').trim_matches(|c| c == '"' || c == '\'');
                    emit_configures(ctx, spec, member, key, source, &mut dedup, out);
                    break;
                }
            }
        }
    }
}

fn emit_configures(
    ctx: &ResolveCtx,
    spec: &'static LanguageSpec,
    node: Node,
    key: &str,
    source: &[u8],
    dedup: &mut HashSet<(String, String)>,
    out: &mut Vec<ResolvedEdge>,
) {
    let Some(target_module) = ctx.env_index.get(key) else { return };
    let caller_qn = enclosing_qn(spec, node, ctx.module_qn, source);
    if !dedup.insert((caller_qn.clone(), key.to_string())) {
        return;
    }
    out.push(
        ResolvedEdge::new(caller_qn, target_module.clone(), EdgeType::Configures)
            .with_property("env_key", serde_json::json!(key))
            .with_property("direction", serde_json::json!("reads")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::SymbolRegistryBuilder;
    use crate::domain::language_spec::language_spec;
    use crate::domain::NodeLabel;
    use std::collections::HashMap;
    use tree_sitter::Parser;

    fn parse(language: Language, source: &str) -> (Vec<u8>, Tree) {
        let ts_lang = match language {
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            _ => unreachable!(),
        };
        let mut parser = Parser::new();
        parser.set_language(&ts_lang).unwrap();
        let bytes = source.as_bytes().to_vec();
        let tree = parser.parse(&bytes, None).unwrap();
        (bytes, tree)
    }

    #[test]
    fn python_method_call_resolves_via_type_map() {
        let source = "class DataProcessor:\n def transform(self):\n pass\n\ndef run():\n proc = DataProcessor()\n proc.transform()\n";
        let (bytes, tree) = parse(Language::Python, source);
        let spec = language_spec(Language::Python).unwrap();

        let mut builder = SymbolRegistryBuilder::new();
        builder.register("DataProcessor", "proj.mod.DataProcessor", NodeLabel::Class);
        builder.register("transform", "proj.mod.DataProcessor.transform", NodeLabel::Method);
        builder.register("run", "proj.mod.run", NodeLabel::Function);
        let registry = builder.seal();

        let mut type_map = HashMap::new();
        type_map.insert("proc".to_string(), "DataProcessor".to_string());
        let import_map: HashMap<String, String> = HashMap::new();
        let env_index = HashMap::new();
        let empty_receiver: HashMap<String, String> = HashMap::new();

        let ctx = ResolveCtx {
            project: "proj",
            file_path: std::path::Path::new("mod.py"),
            module_qn: "proj.mod",
            registry: &registry,
            import_map: &import_map,
            type_map: &type_map,
            receiver_map: &empty_receiver,
            env_index: &env_index,
        };

        let edges = resolve_generic(spec, &ctx, &bytes, &tree);
        assert!(edges.iter().any(|e| e.edge_type == EdgeType::Calls
                && e.caller_qn == "proj.mod.run"
                && e.target_qn == "proj.mod.DataProcessor.transform"));
    }

    #[test]
    fn go_receiver_method_call_resolves() {
        let source = "package main\ntype Mux struct{}\nfunc (m *Mux) Handle() {}\nfunc (m *Mux) Serve() {\n\tm.Handle()\n}\n";
        let (bytes, tree) = parse(Language::Go, source);
        let spec = language_spec(Language::Go).unwrap();

        let mut builder = SymbolRegistryBuilder::new();
        builder.register("Mux", "proj.main.Mux", NodeLabel::Class);
        builder.register("Handle", "proj.main.Mux.Handle", NodeLabel::Method);
        builder.register("Serve", "proj.main.Mux.Serve", NodeLabel::Method);
        let registry = builder.seal();

        let type_map = HashMap::new();
        let import_map: HashMap<String, String> = HashMap::new();
        let env_index = HashMap::new();
        let empty_receiver: HashMap<String, String> = HashMap::new();

        let ctx = ResolveCtx {
            project: "proj",
            file_path: std::path::Path::new("main.go"),
            module_qn: "proj.main",
            registry: &registry,
            import_map: &import_map,
            type_map: &type_map,
            receiver_map: &empty_receiver,
            env_index: &env_index,
        };

        let edges = resolve_generic(spec, &ctx, &bytes, &tree);
        assert!(edges.iter().any(|e| e.edge_type == EdgeType::Calls
                && e.caller_qn == "proj.main.Mux.Serve"
                && e.target_qn == "proj.main.Mux.Handle"));
    }
}
