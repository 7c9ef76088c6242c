//! Pass 2: per-module `var_name -> class_name` bindings consumed by
//! the CALLS resolver to turn `obj.method()` into `Class.method`.
//!
//! The binding here is the *unresolved* class-name text, not a QN — this
//! function only sees one file and has no registry to resolve against
//! (the registry is sealed once, after every file's pass 1 output has been
//! merged, and handed to the resolution passes instead). `resolve.rs` is
//! the place that turns a bound name into a QN, via `resolve_as_class`.

use std::collections::HashMap;

use tree_sitter::Tree;

use crate::application::ports::TypeMap;
use crate::domain::language_spec::LanguageSpec;
use crate::domain::Language;

use super::walk::{all_descendants, text};

pub fn infer_types(spec: &'static LanguageSpec, _module_qn: &str, source: &[u8], tree: &Tree) -> TypeMap {
    match spec.language {
        Language::Python => infer_python(source, tree),
        Language::Go => infer_go(source, tree),
        _ => HashMap::new(),
    }
}

fn infer_python(source: &[u8], tree: &Tree) -> TypeMap {
    let mut map = HashMap::new();
    let mut assignments = Vec::new();
    all_descendants(tree.root_node(), &["assignment"], &mut assignments);
    for assignment in assignments {
        let Some(left) = assignment.child_by_field_name("left") else { continue };
        if left.kind() != "identifier" {
            continue;
        }
        let Some(right) = assignment.child_by_field_name("right") else { continue };
        if right.kind() != "call" {
            continue;
        }
        let Some(callee) = right.child_by_field_name("function") else { continue };
        let class_name = text(callee, source).to_string();
        map.insert(text(left, source).to_string(), class_name);
    }
    map
}

fn infer_go(source: &[u8], tree: &Tree) -> TypeMap {
    let mut map = HashMap::new();

    let mut short_decls = Vec::new();
    all_descendants(tree.root_node(), &["short_var_declaration"], &mut short_decls);
    for decl in short_decls {
        let Some(left) = decl.child_by_field_name("left") else { continue };
        let Some(right) = decl.child_by_field_name("right") else { continue };
        if left.kind() != "expression_list" || right.kind() != "expression_list" {
            continue;
        }
        let Some(name_node) = left.named_child(0) else { continue };
        let Some(value_node) = right.named_child(0) else { continue };
        if let Some(class_name) = go_constructed_type(value_node, source) {
            map.insert(text(name_node, source).to_string(), class_name);
        }
    }

    let mut var_specs = Vec::new();
    all_descendants(tree.root_node(), &["var_spec"], &mut var_specs);
    for spec_node in var_specs {
        let Some(name_node) = spec_node.child_by_field_name("name") else { continue };
        let Some(type_node) = spec_node.child_by_field_name("type") else { continue };
        let raw = text(type_node, source).trim_start_matches(['*', '&']).to_string();
        map.insert(text(name_node, source).to_string(), raw);
    }

    map
}

fn go_constructed_type(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "composite_literal" => node.child_by_field_name("type").map(|t| text(t, source).trim_start_matches(['*', '&']).to_string()),
        "unary_expression" => {
            let inner = node.named_child(0)?;
            go_constructed_type(inner, source)
        }
        "call_expression" => {
            let callee = node.child_by_field_name("function")?;
            Some(text(callee, source).trim_start_matches("new").to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    #[test]
    fn python_binds_constructor_call_result() {
        let source = "proc = DataProcessor()\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let map = infer_python(source.as_bytes(), &tree);
        assert_eq!(map.get("proc"), Some(&"DataProcessor".to_string()));
    }

    #[test]
    fn go_binds_composite_literal_pointer_type() {
        let source = "package main\nfunc f() {\n\tm:= &Mux{}\n}\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let map = infer_go(source.as_bytes(), &tree);
        assert_eq!(map.get("m"), Some(&"Mux".to_string()));
    }
}
