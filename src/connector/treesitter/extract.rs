//! Generic declaration extraction: one tree walk per file producing
//! Function/Method/Class/Interface/Enum/Variable nodes, their DEFINES /
//! DEFINES_METHOD containment, and the per-declaration properties the
//! catalogue's strategies know how to read off each grammar.

use tree_sitter::{Node, Tree};

use crate::application::ports::{Declaration, ExtractedFile, RawImport};
use crate::domain::language_spec::{BaseClassStrategy, DecoratorStrategy, DocCommentStyle, LanguageSpec};
use crate::domain::{module_qualified_name, nested_qualified_name, Language, NodeLabel};

use super::walk::{
    all_descendants, clean_type, count_descendant_kinds, declaration_name, field_path, find_descendant,
    first_field, text,
};

pub fn extract_generic(
    spec: &'static LanguageSpec,
    file_path: &std::path::Path,
    project: &str,
    source: &[u8],
    tree: &Tree,
) -> ExtractedFile {
    let module_qn = module_qualified_name(project, file_path);
    let mut out = ExtractedFile::default();

    let module_name = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| module_qn.clone());
    out.module_node = Some(crate::domain::Node::new(
            project,
            NodeLabel::Module,
            module_name,
            module_qn.clone(),
            file_path.to_string_lossy(),
            0,
            tree.root_node().end_position().row as u32,
    ));

    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        collect_imports(spec, child, source, &mut out.imports);
    }

    walk(spec, project, file_path, source, root, &module_qn, false, &mut out.declarations);
    out
}

/// Recurses the tree, threading the current container QN and whether that
/// container is class-like.
fn walk(
    spec: &'static LanguageSpec,
    project: &str,
    file_path: &std::path::Path,
    source: &[u8],
    node: Node,
    container_qn: &str,
    container_is_class: bool,
    out: &mut Vec<Declaration>,
) {
    let kind = node.kind();

    if is_class_like(spec, spec.language, kind) {
        let Some(name) = declaration_name(node, source) else {
            recurse_children(spec, project, file_path, source, node, container_qn, container_is_class, out);
            return;
        };
        let label = classify_container(spec.language, node, kind, source);
        let qn = nested_qualified_name(container_qn, name);
        let mut decl_node = crate::domain::Node::new(
            project,
            label,
            name,
            qn.clone(),
            file_path.to_string_lossy(),
            node.start_position().row as u32,
            node.end_position().row as u32,
        );
        let bases = extract_base_classes(spec, node, source);
        decl_node = decl_node.with_property("base_classes", serde_json::json!(bases));
        decl_node = decl_node.with_property("is_abstract", serde_json::json!(is_abstract(spec.language, node, source)));
        out.push(Declaration {
                node: decl_node,
                container_qn: container_qn.to_string(),
        });
        recurse_children(spec, project, file_path, source, node, &qn, true, out);
        return;
    }

    if is_function_like(spec, kind) {
        let Some(name) = declaration_name(node, source) else {
            recurse_children(spec, project, file_path, source, node, container_qn, container_is_class, out);
            return;
        };
        let label = if container_is_class { NodeLabel::Method } else { NodeLabel::Function };
        let qn = nested_qualified_name(container_qn, name);
        let decl_node = build_function_node(spec, project, file_path, source, node, name, &qn, label);
        out.push(Declaration {
                node: decl_node,
                container_qn: container_qn.to_string(),
        });
        // Function/method bodies are not new containers; nested
        // definitions still resolve to the nearest class-typed ancestor.
        recurse_children(spec, project, file_path, source, node, container_qn, container_is_class, out);
        return;
    }

    if spec.variable_node_types.contains(&kind) && !container_is_class {
        // Top-level variable declarations become Variable nodes; the resolved string value (if any) is filled in by the
        // caller via the constants table, since this walk has no table of
        // its own — pass 1's own constant resolver runs separately and
        // feeds ExtractedFile.constants. Variable *nodes* here carry no
        // properties beyond identity; a richer value hookup would require
        // threading the same table this function never sees.
        if let Some(names) = variable_names(spec.language, node, source) {
            for name in names {
                let qn = nested_qualified_name(container_qn, &name);
                let decl_node = crate::domain::Node::new(
                    project,
                    NodeLabel::Variable,
                    name,
                    qn,
                    file_path.to_string_lossy(),
                    node.start_position().row as u32,
                    node.end_position().row as u32,
                );
                out.push(Declaration {
                        node: decl_node,
                        container_qn: container_qn.to_string(),
                });
            }
        }
    }

    recurse_children(spec, project, file_path, source, node, container_qn, container_is_class, out);
}

fn recurse_children(
    spec: &'static LanguageSpec,
    project: &str,
    file_path: &std::path::Path,
    source: &[u8],
    node: Node,
    container_qn: &str,
    container_is_class: bool,
    out: &mut Vec<Declaration>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(spec, project, file_path, source, child, container_qn, container_is_class, out);
    }
}

fn is_class_like(spec: &LanguageSpec, _language: Language, kind: &str) -> bool {
    spec.class_node_types.contains(&kind) || spec.interface_node_types.contains(&kind) || spec.enum_node_types.contains(&kind)
}

pub(crate) fn is_function_like(spec: &LanguageSpec, kind: &str) -> bool {
    spec.function_node_types.contains(&kind) || spec.method_node_types.contains(&kind)
}

pub(crate) fn is_class_like_kind(spec: &LanguageSpec, kind: &str) -> bool {
    is_class_like(spec, spec.language, kind)
}

/// Disambiguates Class/Interface/Enum for languages whose grammar reuses
/// one node kind for all three (Go `type_declaration`, Kotlin
/// `class_declaration`).
fn classify_container(language: Language, node: Node, kind: &str, source: &[u8]) -> NodeLabel {
    match language {
        Language::Go if kind == "type_declaration" => {
            if let Some(type_spec) = find_descendant(node, &["type_spec"]) {
                if let Some(type_field) = type_spec.child_by_field_name("type") {
                    return match type_field.kind() {
                        "interface_type" => NodeLabel::Interface,
                        "struct_type" => NodeLabel::Class,
                        _ => NodeLabel::Type,
                    };
                }
            }
            NodeLabel::Type
        }
        Language::Kotlin if kind == "class_declaration" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if !child.is_named() {
                    match text(child, source) {
                        "interface" => return NodeLabel::Interface,
                        "enum" => return NodeLabel::Enum,
                        "class" => break,
                        _ => {}
                    }
                }
            }
            NodeLabel::Class
        }
        _ => {
            if spec_contains_interface(language, kind) {
                NodeLabel::Interface
            } else if spec_contains_enum(language, kind) {
                NodeLabel::Enum
            } else {
                NodeLabel::Class
            }
        }
    }
}

fn spec_contains_interface(language: Language, kind: &str) -> bool {
    crate::domain::language_spec::language_spec(language)
        .map(|s| s.interface_node_types.contains(&kind) && !s.class_node_types.contains(&kind))
        .unwrap_or(false)
}

fn spec_contains_enum(language: Language, kind: &str) -> bool {
    crate::domain::language_spec::language_spec(language)
        .map(|s| s.enum_node_types.contains(&kind) && !s.class_node_types.contains(&kind))
        .unwrap_or(false)
}

fn is_abstract(language: Language, node: Node, source: &[u8]) -> bool {
    match language {
        Language::Java | Language::Kotlin | Language::CSharp => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "modifiers" && text(child, source).contains("abstract") {
                    return true;
                }
            }
            false
        }
        _ => false,
    }
}

fn build_function_node(
    spec: &'static LanguageSpec,
    project: &str,
    file_path: &std::path::Path,
    source: &[u8],
    node: Node,
    name: &str,
    qn: &str,
    label: NodeLabel,
) -> crate::domain::Node {
    let mut decl_node = crate::domain::Node::new(
        project,
        label,
        name,
        qn,
        file_path.to_string_lossy(),
        node.start_position().row as u32,
        node.end_position().row as u32,
    );

    if let Some(params) = first_field(node, spec.param_list_fields) {
        decl_node = decl_node.with_property("signature", serde_json::json!(text(params, source)));
        let param_types = extract_param_types(spec, params, source);
        decl_node = decl_node.with_property("param_types", serde_json::json!(param_types));
    } else {
        decl_node = decl_node.with_property("param_types", serde_json::json!(Vec::<String>::new()));
    }

    let complexity = 1 + count_descendant_kinds(node, spec.branching_node_types);
    decl_node = decl_node.with_property("complexity", serde_json::json!(complexity));

    let return_types = extract_return_types(spec, node, source);
    decl_node = decl_node.with_property("return_types", serde_json::json!(return_types));

    let decorators = extract_decorators(spec, node, source);
    decl_node = decl_node.with_property("decorators", serde_json::json!(decorators));

    if let Some(doc) = extract_docstring(spec, node, source) {
        decl_node = decl_node.with_property("docstring", serde_json::json!(doc));
    }

    let is_test = spec.test_name_prefixes.iter().any(|p| name.starts_with(p))
    || decorators.iter().any(|d| d.contains("Test"))
    || (spec.test_name_prefixes.is_empty() && name.to_lowercase().contains("test"));
    decl_node = decl_node.with_property("is_test", serde_json::json!(is_test));

    let is_entry_point = name == "main"
    || decorators
        .iter()
        .any(|d| spec.entry_point_markers.iter().any(|m| d.contains(m)));
    decl_node = decl_node.with_property("is_entry_point", serde_json::json!(is_entry_point));

    if spec.language == Language::Go && label == NodeLabel::Method {
        if let Some(receiver) = node.child_by_field_name("receiver") {
            decl_node = decl_node.with_property("receiver", serde_json::json!(text(receiver, source)));
        }
    }

    decl_node
}

pub(crate) fn extract_param_types(spec: &LanguageSpec, param_list: Node, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = param_list.walk();
    for param in param_list.named_children(&mut cursor) {
        let type_node = param
            .child_by_field_name("type")
            .or_else(|| find_descendant(param, &["type_annotation"]))
            .or_else(|| find_descendant(param, &["user_type"]))
            .or_else(|| find_descendant(param, &["type_identifier"]));
        let Some(type_node) = type_node else { continue };
        let cleaned = clean_type(text(type_node, source));
        if cleaned.is_empty() || spec.builtin_types.contains(&cleaned.as_str()) {
            continue;
        }
        if !out.contains(&cleaned) {
            out.push(cleaned);
        }
    }
    out
}

pub(crate) fn extract_return_types(spec: &LanguageSpec, node: Node, source: &[u8]) -> Vec<String> {
    let Some(ret) = first_field(node, spec.return_type_fields) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if spec.language == Language::Go && ret.kind() == "parameter_list" {
        let mut cursor = ret.walk();
        for decl in ret.named_children(&mut cursor) {
            if decl.kind() != "parameter_declaration" {
                continue;
            }
            if let Some(t) = decl.child_by_field_name("type") {
                let cleaned = clean_type(text(t, source));
                if !cleaned.is_empty() && !spec.builtin_types.contains(&cleaned.as_str()) && !out.contains(&cleaned) {
                    out.push(cleaned);
                }
            }
        }
        return out;
    }

    let candidate = if spec.language == Language::Kotlin && ret.kind() != "user_type" {
        find_descendant(ret, &["user_type"]).unwrap_or(ret)
    } else {
        ret
    };
    let cleaned = clean_type(text(candidate, source));
    if !cleaned.is_empty() && !spec.builtin_types.contains(&cleaned.as_str()) {
        out.push(cleaned);
    }
    out
}

fn extract_base_classes(spec: &LanguageSpec, node: Node, source: &[u8]) -> Vec<String> {
    match spec.base_class_strategy {
        BaseClassStrategy::None => Vec::new(),
        BaseClassStrategy::PythonSuperclasses => {
            let Some(field) = node.child_by_field_name("superclasses") else { return Vec::new() };
            collect_identifier_texts(field, source)
        }
        BaseClassStrategy::JavaSuperclassInterfaces => {
            let mut out = Vec::new();
            if let Some(sup) = node.child_by_field_name("superclass") {
                if let Some(id) = find_descendant(sup, &["type_identifier"]) {
                    out.push(text(id, source).to_string());
                }
            }
            if let Some(ifaces) = node.child_by_field_name("interfaces") {
                out.extend(collect_kind_texts(ifaces, &["type_identifier"], source));
            }
            out
        }
        BaseClassStrategy::TsClassHeritage => {
            let mut out = Vec::new();
            if let Some(heritage) = find_descendant(node, &["class_heritage"]) {
                let mut cursor = heritage.walk();
                for clause in heritage.named_children(&mut cursor) {
                    out.extend(collect_kind_texts(clause, &["identifier", "type_identifier"], source));
                }
            } else {
                // Plain JS: bare identifier siblings after `extends`.
                let mut cursor = node.walk();
                let mut saw_extends = false;
                for child in node.children(&mut cursor) {
                    if !child.is_named() && text(child, source) == "extends" {
                        saw_extends = true;
                        continue;
                    }
                    if saw_extends && child.kind() == "identifier" {
                        out.push(text(child, source).to_string());
                        break;
                    }
                }
            }
            out
        }
        BaseClassStrategy::CppBaseClassClause => {
            let Some(clause) = find_descendant(node, &["base_class_clause"]) else { return Vec::new() };
            collect_kind_texts(clause, &["type_identifier", "qualified_identifier"], source)
        }
        BaseClassStrategy::KotlinDelegationSpecifiers => {
            let Some(list) = find_descendant(node, &["delegation_specifier_list"]) else { return Vec::new() };
            let mut out = Vec::new();
            let mut cursor = list.walk();
            for spec_node in list.named_children(&mut cursor) {
                let raw = text(spec_node, source);
                let stripped = raw.split('(').next().unwrap_or(raw).trim();
                if !stripped.is_empty() {
                    out.push(stripped.to_string());
                }
            }
            out
        }
        BaseClassStrategy::RubySuperclassConstant => {
            let Some(sup) = node.child_by_field_name("superclass") else { return Vec::new() };
            find_descendant(sup, &["constant"]).map(|c| vec![text(c, source).to_string()]).unwrap_or_default()
        }
        BaseClassStrategy::SwiftInheritanceSpecifier => {
            let mut out = Vec::new();
            all_descendants(node, &["inheritance_specifier"], &mut out.iter_mut().collect::<Vec<_>>());
            let mut specs = Vec::new();
            all_descendants(node, &["inheritance_specifier"], &mut specs);
            specs
                .into_iter()
                .filter_map(|s| find_descendant(s, &["type_identifier"]).map(|id| text(id, source).to_string()))
                .collect()
        }
        BaseClassStrategy::ScalaExtendsClause => {
            let Some(clause) = find_descendant(node, &["extends_clause"]) else { return Vec::new() };
            collect_kind_texts(clause, &["type_identifier"], source)
        }
        BaseClassStrategy::PhpBaseClause => {
            let clause = node
                .child_by_field_name("base_clause")
                .or_else(|| find_descendant(node, &["base_clause"]));
            let Some(clause) = clause else { return Vec::new() };
            collect_kind_texts(clause, &["name", "qualified_name"], source)
        }
        BaseClassStrategy::CSharpBaseList => {
            let clause = node
                .child_by_field_name("bases")
                .or_else(|| find_descendant(node, &["base_list"]));
            let Some(clause) = clause else { return Vec::new() };
            collect_kind_texts(clause, &["identifier", "generic_name"], source)
        }
    }
}

fn collect_identifier_texts(node: Node, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind().ends_with("identifier") {
            out.push(text(child, source).to_string());
        }
    }
    out
}

fn collect_kind_texts(node: Node, kinds: &[&str], source: &[u8]) -> Vec<String> {
    let mut found = Vec::new();
    all_descendants(node, kinds, &mut found);
    found.into_iter().map(|n| text(n, source).to_string()).collect()
}

fn extract_decorators(spec: &LanguageSpec, node: Node, source: &[u8]) -> Vec<String> {
    match spec.decorator_strategy {
        DecoratorStrategy::None => Vec::new(),
        DecoratorStrategy::PythonDecoratorChildren => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "decorator" {
                    out.push(text(child, source).to_string());
                }
            }
            out
        }
        DecoratorStrategy::ModifiersAnnotation => {
            let Some(modifiers) = find_descendant(node, &["modifiers"]) else { return Vec::new() };
            collect_kind_texts(modifiers, &["annotation", "marker_annotation"], source)
        }
        DecoratorStrategy::CSharpAttributeList => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "attribute_list" {
                    out.push(text(child, source).to_string());
                }
            }
            out
        }
        DecoratorStrategy::PrecedingSiblingDecorator | DecoratorStrategy::PrecedingSiblingAnnotation => {
            preceding_siblings_of_kind(node, "decorator", source)
                .into_iter()
                .chain(preceding_siblings_of_kind(node, "annotation", source))
                .collect()
        }
        DecoratorStrategy::RustPrecedingAttributeItems => preceding_siblings_of_kind(node, "attribute_item", source),
        DecoratorStrategy::PhpAttributeGroups => {
            let Some(list) = find_descendant(node, &["attribute_list"]) else { return Vec::new() };
            collect_kind_texts(list, &["attribute"], source)
        }
        DecoratorStrategy::SwiftAttributeChildren => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "attribute" {
                    out.push(text(child, source).to_string());
                }
            }
            out
        }
        DecoratorStrategy::DirectAnnotationChildren => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "annotation" {
                    out.push(text(child, source).to_string());
                }
            }
            out
        }
    }
}

/// Walks backward through `node`'s siblings collecting ones of `kind`,
/// stopping at the first sibling that doesn't match.
fn preceding_siblings_of_kind(node: Node, kind: &str, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(sib) = current {
        if sib.kind() != kind {
            break;
        }
        out.push(text(sib, source).to_string());
        current = sib.prev_sibling();
    }
    out.reverse();
    out
}

fn extract_docstring(spec: &LanguageSpec, node: Node, source: &[u8]) -> Option<String> {
    match spec.doc_comment_style {
        DocCommentStyle::PythonDocstring => {
            let body = node.child_by_field_name("body")?;
            let first = body.named_child(0)?;
            if first.kind() != "expression_statement" {
                return None;
            }
            let string_node = first.named_child(0)?;
            if string_node.kind() != "string" {
                return None;
            }
            let raw = text(string_node, source);
            Some(dedent(raw.trim_matches(|c| c == '"' || c == '\'')))
        }
        DocCommentStyle::LinePrefix(prefix) => scan_line_comments_above(node, source, prefix),
        DocCommentStyle::BlockComment => scan_block_comment_above(node, source),
    }
}

fn dedent(s: &str) -> String {
    let lines: Vec<&str> = s.lines().collect();
    if lines.len() <= 1 {
        return s.trim().to_string();
    }
    let min_indent = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    std::iter::once(lines[0].trim())
        .chain(lines[1..].iter().map(|l| l.get(min_indent..).unwrap_or("").trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn scan_line_comments_above(node: Node, source: &[u8], prefix: &str) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(sib) = current {
        if sib.kind() != "line_comment" && sib.kind() != "comment" {
            break;
        }
        let raw = text(sib, source);
        if !raw.trim_start().starts_with(prefix) {
            break;
        }
        lines.push(raw.trim_start().trim_start_matches(prefix).trim().to_string());
        current = sib.prev_sibling();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

fn scan_block_comment_above(node: Node, source: &[u8]) -> Option<String> {
    let sib = node.prev_sibling()?;
    if sib.kind() != "comment" && sib.kind() != "block_comment" {
        return None;
    }
    let raw = text(sib, source);
    if !raw.starts_with("/*") {
        return None;
    }
    let inner = raw
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/")
        .trim();
    Some(
        inner
            .lines()
            .map(|l| l.trim().trim_start_matches('*').trim())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
    )
}

fn collect_imports(spec: &LanguageSpec, node: Node, source: &[u8], out: &mut Vec<RawImport>) {
    let kind = node.kind();
    if spec.import_node_types.contains(&kind) || spec.import_from_types.contains(&kind) {
        match spec.language {
            Language::Go => {
                for spec_node in find_all(node, "import_spec") {
                    let path = spec_node
                        .child_by_field_name("path")
                        .map(|p| text(p, source).to_string())
                        .unwrap_or_default();
                    let alias = spec_node.child_by_field_name("name").map(|n| text(n, source).to_string());
                    out.push(RawImport { path, alias });
                }
                if find_all(node, "import_spec").is_empty() {
                    if let Some(path_node) = find_descendant(node, &["interpreted_string_literal"]) {
                        out.push(RawImport {
                                path: text(path_node, source).to_string(),
                                alias: None,
                        });
                    }
                }
            }
            Language::Python => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "dotted_name" => out.push(RawImport {
                                path: text(child, source).to_string(),
                                alias: None,
                        }),
                        "aliased_import" => {
                            let name = child.child_by_field_name("name").map(|n| text(n, source).to_string());
                            let alias = child.child_by_field_name("alias").map(|n| text(n, source).to_string());
                            if let Some(name) = name {
                                out.push(RawImport { path: name, alias });
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {
                out.push(RawImport {
                        path: text(node, source).to_string(),
                        alias: None,
                });
            }
        }
    }
}

fn find_all<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    all_descendants(node, &[kind], &mut out);
    out
}

/// Top-level variable-name extraction used only to give Variable nodes an
/// identity; value resolution itself is the constant resolver's job.
fn variable_names(language: Language, node: Node, source: &[u8]) -> Option<Vec<String>> {
    match language {
        Language::Python => {
            let left = node.child_by_field_name("left")?;
            (left.kind() == "identifier").then(|| vec![text(left, source).to_string()])
        }
        Language::Go => {
            let mut out = Vec::new();
            for spec_node in find_all(node, "const_spec") {
                if let Some(n) = spec_node.child_by_field_name("name") {
                    out.push(text(n, source).to_string());
                }
            }
            for spec_node in find_all(node, "var_spec") {
                if let Some(n) = spec_node.child_by_field_name("name") {
                    out.push(text(n, source).to_string());
                }
            }
            (!out.is_empty()).then_some(out)
        }
        Language::Rust => node.child_by_field_name("name").map(|n| vec![text(n, source).to_string()]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language_spec::language_spec;
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
    fn go_interface_and_struct_classify_distinctly() {
        let source = "package main\ntype Handler interface { ServeHTTP() }\ntype Mux struct{}\n";
        let (bytes, tree) = parse(Language::Go, source);
        let spec = language_spec(Language::Go).unwrap();
        let extracted = extract_generic(spec, std::path::Path::new("main.go"), "proj", &bytes, &tree);
        let handler = extracted.declarations.iter().find(|d| d.node.name == "Handler").unwrap();
        assert_eq!(handler.node.label, NodeLabel::Interface);
        let mux = extracted.declarations.iter().find(|d| d.node.name == "Mux").unwrap();
        assert_eq!(mux.node.label, NodeLabel::Class);
    }

    #[test]
    fn go_method_gets_receiver_property() {
        let source = "package main\ntype Mux struct{}\nfunc (m *Mux) ServeHTTP() {}\n";
        let (bytes, tree) = parse(Language::Go, source);
        let spec = language_spec(Language::Go).unwrap();
        let extracted = extract_generic(spec, std::path::Path::new("main.go"), "proj", &bytes, &tree);
        let method = extracted.declarations.iter().find(|d| d.node.name == "ServeHTTP").unwrap();
        assert_eq!(method.node.label, NodeLabel::Method);
        assert_eq!(method.node.property_str("receiver"), Some("(m *Mux)"));
    }

    #[test]
    fn python_class_method_is_contained_by_class() {
        let source = "class DataProcessor:\n def transform(self, data):\n return data\n";
        let (bytes, tree) = parse(Language::Python, source);
        let spec = language_spec(Language::Python).unwrap();
        let extracted = extract_generic(spec, std::path::Path::new("processor.py"), "proj", &bytes, &tree);
        let class = extracted.declarations.iter().find(|d| d.node.name == "DataProcessor").unwrap();
        let method = extracted.declarations.iter().find(|d| d.node.name == "transform").unwrap();
        assert_eq!(method.node.label, NodeLabel::Method);
        assert_eq!(method.container_qn, class.node.qualified_name);
    }

    #[test]
    fn complexity_is_one_for_straight_line_body() {
        let source = "def f():\n return 1\n";
        let (bytes, tree) = parse(Language::Python, source);
        let spec = language_spec(Language::Python).unwrap();
        let extracted = extract_generic(spec, std::path::Path::new("a.py"), "proj", &bytes, &tree);
        let f = extracted.declarations.iter().find(|d| d.node.name == "f").unwrap();
        assert_eq!(f.node.properties.get("complexity"), Some(&serde_json::json!(1)));
    }
}
