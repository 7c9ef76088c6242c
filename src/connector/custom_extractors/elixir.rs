//! Elixir custom extractor. `defmodule`/`def`/`defp` are ordinary
//! macro calls in Elixir's grammar rather than dedicated declaration node
//! kinds, so this walks `call` nodes and dispatches on the callee
//! identifier instead of on node kind the way the generic catalogue does.

use std::path::Path;

use tree_sitter::{Node, Tree};

use crate::application::ports::{Declaration, ExtractedFile, ResolveCtx};
use crate::connector::treesitter::walk::{all_descendants, text};
use crate::domain::{module_qualified_name, nested_qualified_name, EdgeType, NodeLabel, ResolvedEdge};

pub fn extract(file_path: &Path, project: &str, source: &[u8], tree: &Tree) -> ExtractedFile {
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
    walk_calls(project, file_path, &module_qn, root, source, &mut out);
    out
}

fn walk_calls(project: &str, file_path: &Path, container_qn: &str, node: Node, source: &[u8], out: &mut ExtractedFile) {
    if node.kind() == "call" {
        if let Some(target) = call_target(node, source) {
            match target {
                "defmodule" => {
                    if let Some(name) = module_alias(node, source) {
                        let qn = nested_qualified_name(container_qn, &name);
                        let decl_node = crate::domain::Node::new(
                            project,
                            NodeLabel::Class,
                            name,
                            qn.clone(),
                            file_path.to_string_lossy(),
                            node.start_position().row as u32,
                            node.end_position().row as u32,
                        );
                        out.declarations.push(Declaration {
                                node: decl_node,
                                container_qn: container_qn.to_string(),
                        });
                        if let Some(body) = do_block(node) {
                            walk_calls(project, file_path, &qn, body, source, out);
                        }
                        return;
                    }
                }
                "def" | "defp" => {
                    if let Some(name) = def_name(node, source) {
                        let module_qn = module_qualified_name(project, file_path);
                        let label = if container_qn == module_qn { NodeLabel::Function } else { NodeLabel::Method };
                        let qn = nested_qualified_name(container_qn, &name);
                        let decl_node = crate::domain::Node::new(
                            project,
                            label,
                            name,
                            qn,
                            file_path.to_string_lossy(),
                            node.start_position().row as u32,
                            node.end_position().row as u32,
                        )
                            .with_property("is_private", serde_json::json!(target == "defp"));
                        out.declarations.push(Declaration {
                                node: decl_node,
                                container_qn: container_qn.to_string(),
                        });
                    }
                    return;
                }
                _ => {}
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_calls(project, file_path, container_qn, child, source, out);
    }
}

fn call_target<'a>(node: Node<'a>, source: &'a [u8]) -> Option<&'a str> {
    let target = node.child_by_field_name("target")?;
    Some(text(target, source))
}

fn module_alias(node: Node, source: &[u8]) -> Option<String> {
    let args = node.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        if child.kind() == "alias" {
            return Some(text(child, source).to_string());
        }
    }
    None
}

fn def_name(node: Node, source: &[u8]) -> Option<String> {
    let args = node.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => return Some(text(child, source).to_string()),
            "call" => {
                let head = child.child_by_field_name("target")?;
                return Some(text(head, source).to_string());
            }
            "binary_operator" => {
                let left = child.child_by_field_name("left")?;
                return def_name_from_head(left, source);
            }
            _ => {}
        }
    }
    None
}

fn def_name_from_head(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" => Some(text(node, source).to_string()),
        "call" => {
            let head = node.child_by_field_name("target")?;
            Some(text(head, source).to_string())
        }
        _ => None,
    }
}

fn do_block(node: Node) -> Option<Node> {
    node.children(&mut node.walk()).find(|c| c.kind() == "do_block")
}

pub fn resolve(ctx: &ResolveCtx, source: &[u8], tree: &Tree) -> Vec<ResolvedEdge> {
    let mut edges = Vec::new();
    let root = tree.root_node();
    let mut calls = Vec::new();
    all_descendants(root, &["call"], &mut calls);

    for call in calls {
        let Some(target) = call_target(call, source) else { continue };
        if matches!(target, "defmodule" | "def" | "defp" | "import" | "alias" | "require" | "use") {
            continue;
        }
        let caller_qn = enclosing_def_qn(call, ctx.module_qn, source);
        if let Some(target_qn) = ctx.registry.resolve(target, ctx.module_qn, ctx.import_map) {
            if target_qn != caller_qn {
                edges.push(ResolvedEdge::new(caller_qn, target_qn, EdgeType::Calls));
            }
        }
    }
    edges
}

fn enclosing_def_qn(node: Node, module_qn: &str, source: &[u8]) -> String {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "call" {
            if let Some(target) = call_target(n, source) {
                if target == "def" || target == "defp" {
                    if let Some(name) = def_name(n, source) {
                        return nested_qualified_name(module_qn, &name);
                    }
                }
            }
        }
        current = n.parent();
    }
    module_qn.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> (Vec<u8>, Tree) {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_elixir::LANGUAGE.into()).unwrap();
        let bytes = source.as_bytes().to_vec();
        let tree = parser.parse(&bytes, None).unwrap();
        (bytes, tree)
    }

    #[test]
    fn defmodule_and_def_are_extracted() {
        let source = "defmodule Greeter do\n def hello(name) do\n name\n end\nend\n";
        let (bytes, tree) = parse(source);
        let extracted = extract(Path::new("greeter.ex"), "proj", &bytes, &tree);
        let names: Vec<&str> = extracted.declarations.iter().map(|d| d.node.name.as_str()).collect();
        assert!(names.contains(&"Greeter"));
        assert!(names.contains(&"hello"));
    }
}
