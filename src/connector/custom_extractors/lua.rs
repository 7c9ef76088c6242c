//! Lua custom extractor. Lua has
//! no class construct the catalogue can express, so this only ever produces
//! `Function` nodes directly under the `Module` container; named functions
//! and the two anonymous-assignment shapes (`local f = function() end` and
//! `f = function() end`) are normalised to the same naming rule so a caller
//! elsewhere in the file resolves to the same QN regardless of which form
//! defined it.

use std::path::Path;

use tree_sitter::{Node, Tree};

use crate::application::ports::{Declaration, ExtractedFile, RawImport, ResolveCtx};
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

    let mut named = Vec::new();
    all_descendants(root, &["function_declaration"], &mut named);
    for func in named {
        let Some(name) = lua_dotted_name(func, source) else { continue };
        push_function(project, file_path, &module_qn, func, &name, &mut out.declarations);
    }

    let mut local_funcs = Vec::new();
    all_descendants(root, &["local_function"], &mut local_funcs);
    for func in local_funcs {
        let Some(name_node) = func.child_by_field_name("name") else { continue };
        let name = text(name_node, source).to_string();
        push_function(project, file_path, &module_qn, func, &name, &mut out.declarations);
    }

    let mut assignments = Vec::new();
    all_descendants(root, &["variable_declaration", "assignment_statement"], &mut assignments);
    for assignment in assignments {
        for (name, value) in lua_assignment_pairs(assignment, source) {
            if value.kind() == "function_definition" {
                push_function(project, file_path, &module_qn, value, &name, &mut out.declarations);
            }
        }
    }

    let mut requires = Vec::new();
    all_descendants(root, &["function_call"], &mut requires);
    for call in requires {
        let Some(name_node) = call.child_by_field_name("name") else { continue };
        if text(name_node, source) != "require" {
            continue;
        }
        let Some(args) = call.child_by_field_name("arguments") else { continue };
        let Some(arg) = args.named_child(0) else { continue };
        out.imports.push(RawImport {
                path: text(arg, source).trim_matches(['"', '\'']).to_string(),
                alias: None,
        });
    }

    out
}

fn push_function(
    project: &str,
    file_path: &Path,
    module_qn: &str,
    node: Node,
    name: &str,
    out: &mut Vec<Declaration>,
) {
    let qn = nested_qualified_name(module_qn, name);
    let decl_node = crate::domain::Node::new(
        project,
        NodeLabel::Function,
        name,
        qn,
        file_path.to_string_lossy(),
        node.start_position().row as u32,
        node.end_position().row as u32,
    );
    out.push(Declaration {
            node: decl_node,
            container_qn: module_qn.to_string(),
    });
}

/// `function M.foo() end` -> field `name` is a `dot_index_expression`; the
/// registered name is the last dotted segment (`foo`), matching the plain
/// `function foo() end` case so both resolve the same way from a caller.
fn lua_dotted_name(func: Node, source: &[u8]) -> Option<String> {
    let name_node = func.child_by_field_name("name")?;
    let raw = text(name_node, source);
    Some(raw.rsplit(['.', ':']).next().unwrap_or(raw).to_string())
}

/// Pairs up `variable_list`/`expression_list` positionally, covering both
/// `local f = function() end` (`variable_declaration`) and `f = function()
/// end` (`assignment_statement`).
fn lua_assignment_pairs<'a>(node: Node<'a>, source: &'a [u8]) -> Vec<(String, Node<'a>)> {
    let Some(names) = node.child_by_field_name("name") else { return Vec::new() };
    let Some(values) = node.child_by_field_name("value") else { return Vec::new() };

    let name_nodes: Vec<Node> = if names.kind().ends_with("list") {
        let mut cursor = names.walk();
        names.named_children(&mut cursor).collect()
    } else {
        vec![names]
    };
    let value_nodes: Vec<Node> = if values.kind().ends_with("list") {
        let mut cursor = values.walk();
        values.named_children(&mut cursor).collect()
    } else {
        vec![values]
    };

    name_nodes
        .into_iter()
        .zip(value_nodes)
        .filter(|(n, _)| n.kind() == "identifier")
        .map(|(n, v)| (text(n, source).to_string(), v))
        .collect()
}

pub fn resolve(ctx: &ResolveCtx, source: &[u8], tree: &Tree) -> Vec<ResolvedEdge> {
    let mut edges = Vec::new();
    let root = tree.root_node();
    let mut calls = Vec::new();
    all_descendants(root, &["function_call"], &mut calls);

    for call in calls {
        let Some(name_node) = call.child_by_field_name("name") else { continue };
        let callee = text(name_node, source);
        if callee == "require" {
            continue;
        }
        let simple = callee.rsplit(['.', ':']).next().unwrap_or(callee);
        let caller_qn = enclosing_function_qn(call, ctx.module_qn, source);
        if let Some(target_qn) = ctx.registry.resolve(simple, ctx.module_qn, ctx.import_map) {
            if target_qn != caller_qn {
                edges.push(ResolvedEdge::new(caller_qn, target_qn, EdgeType::Calls));
            }
        }
    }
    edges
}

fn enclosing_function_qn(node: Node, module_qn: &str, source: &[u8]) -> String {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "function_declaration" => {
                if let Some(name) = lua_dotted_name(n, source) {
                    return nested_qualified_name(module_qn, &name);
                }
            }
            "local_function" => {
                if let Some(name_node) = n.child_by_field_name("name") {
                    return nested_qualified_name(module_qn, text(name_node, source));
                }
            }
            "function_definition" => {
                if let Some(parent) = n.parent() {
                    for (name, value) in lua_assignment_pairs(parent, source) {
                        if value == n {
                            return nested_qualified_name(module_qn, &name);
                        }
                    }
                }
            }
            _ => {}
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
        parser.set_language(&tree_sitter_lua::LANGUAGE.into()).unwrap();
        let bytes = source.as_bytes().to_vec();
        let tree = parser.parse(&bytes, None).unwrap();
        (bytes, tree)
    }

    #[test]
    fn named_and_anonymous_functions_agree_on_qn() {
        let (bytes, tree) = parse("local function helper() end\nlocal other = function() end\n");
        let extracted = extract(Path::new("util.lua"), "proj", &bytes, &tree);
        let names: Vec<&str> = extracted.declarations.iter().map(|d| d.node.name.as_str()).collect();
        assert!(names.contains(&"helper"));
        assert!(names.contains(&"other"));
    }

    #[test]
    fn dotted_function_name_uses_last_segment() {
        let (bytes, tree) = parse("function M.foo() end\n");
        let extracted = extract(Path::new("m.lua"), "proj", &bytes, &tree);
        assert_eq!(extracted.declarations[0].node.name, "foo");
    }
}
