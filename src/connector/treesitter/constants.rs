//! Module-level constant propagation: a single left-to-right pass
//! over a module's top-level assignments that resolves string-valued
//! expressions, including interpolation, concatenation and a handful of
//! call-form conventions (`fmt.Sprintf`, `format!`,...).

use std::collections::HashMap;

use tree_sitter::{Node, Tree};

use crate::domain::language_spec::LanguageSpec;
use crate::domain::Language;

use super::walk::text;

/// Walks `tree`'s top-level statements (plus, for Java, one extra level
/// into each class body — Java constants live in `field_declaration`
/// nodes, not at the top level) looking for assignment-shaped nodes this
/// language's grammar uses, resolving right-hand sides against the table
/// built so far. Returns `NAME -> value` in first-seen order.
pub fn resolve_module_constants(spec: &LanguageSpec, source: &[u8], tree: &Tree) -> Vec<(String, String)> {
    let root = tree.root_node();
    let mut table: HashMap<String, String> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for candidate in top_level_candidates(spec.language, root) {
        for (name, value_node) in assignment_shapes(spec.language, candidate, source) {
            let Some(value) = resolve_value(value_node, source, &table) else {
                continue;
            };
            if !table.contains_key(&name) {
                order.push(name.clone());
            }
            table.insert(name, value);
        }
    }

    order.into_iter().map(|name| (name.clone(), table[&name].clone())).collect()
}

fn top_level_candidates<'a>(language: Language, root: Node<'a>) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        out.push(child);
        if language == Language::Java && child.kind() == "class_declaration" {
            if let Some(body) = child.child_by_field_name("body") {
                let mut c2 = body.walk();
                out.extend(body.named_children(&mut c2));
            }
        }
    }
    out
}

/// Recognises `node` as one (or more, for multi-spec `const`/`var` blocks)
/// `name = string-expr` binding for `language`, per the per-language shapes
/// enumerated in. Non-string assignments (ints, bools, unresolvable
/// expressions) are filtered later by `resolve_value` returning `None`, not
/// here.
fn assignment_shapes<'a>(language: Language, node: Node<'a>, source: &[u8]) -> Vec<(String, Node<'a>)> {
    match (language, node.kind()) {
        (Language::Python, "assignment") => {
            let left = node.child_by_field_name("left");
            let right = node.child_by_field_name("right");
            match (left, right) {
                (Some(l), Some(r)) if l.kind() == "identifier" => vec![(text(l, source).to_string(), r)],
                _ => vec![],
            }
        }
        (Language::Go, "const_declaration") | (Language::Go, "var_declaration") => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for spec_node in node.named_children(&mut cursor) {
                if !spec_node.kind().ends_with("_spec") {
                    continue;
                }
                let Some(name_node) = spec_node.child_by_field_name("name") else { continue };
                let Some(value_node) = spec_node.child_by_field_name("value") else { continue };
                let rhs = if value_node.kind() == "expression_list" {
                    value_node.named_child(0)
                } else {
                    Some(value_node)
                };
                if let Some(rhs) = rhs {
                    out.push((text(name_node, source).to_string(), rhs));
                }
            }
            out
        }
        (Language::JavaScript, "lexical_declaration")
        | (Language::JavaScript, "variable_declaration")
        | (Language::TypeScript, "lexical_declaration")
        | (Language::TypeScript, "variable_declaration") => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(name_node) = declarator.child_by_field_name("name") else { continue };
                let Some(value_node) = declarator.child_by_field_name("value") else { continue };
                out.push((text(name_node, source).to_string(), value_node));
            }
            out
        }
        (Language::Rust, "const_item") | (Language::Rust, "let_declaration") => {
            let name_field = node
                .child_by_field_name("name")
                .or_else(|| node.child_by_field_name("pattern"));
            let value_field = node.child_by_field_name("value");
            match (name_field, value_field) {
                (Some(n), Some(v)) => vec![(text(n, source).to_string(), v)],
                _ => vec![],
            }
        }
        (Language::Java, "field_declaration") => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(name_node) = declarator.child_by_field_name("name") else { continue };
                let Some(value_node) = declarator.child_by_field_name("value") else { continue };
                out.push((text(name_node, source).to_string(), value_node));
            }
            out
        }
        (Language::Php, "expression_statement") => {
            let Some(assign) = node.named_child(0) else { return vec![] };
            if assign.kind() != "assignment_expression" {
                return vec![];
            }
            let Some(left) = assign.child_by_field_name("left") else { return vec![] };
            let Some(right) = assign.child_by_field_name("right") else { return vec![] };
            let name = text(left, source).trim_start_matches('$').to_string();
            vec![(name, right)]
        }
        (Language::Scala, "val_definition") | (Language::Scala, "var_definition") => {
            let name_field = node
                .child_by_field_name("pattern")
                .or_else(|| node.child_by_field_name("name"));
            let value_field = node.child_by_field_name("value");
            match (name_field, value_field) {
                (Some(n), Some(v)) => vec![(text(n, source).to_string(), v)],
                _ => vec![],
            }
        }
        (Language::Kotlin, "property_declaration") => {
            let Some(name_node) = super::walk::declaration_name(node, source) else { return vec![] };
            let mut cursor = node.walk();
            let mut saw_equals = false;
            let mut value = None;
            for child in node.children(&mut cursor) {
                if saw_equals && child.is_named() {
                    value = Some(child);
                    break;
                }
                if text(child, source) == "=" {
                    saw_equals = true;
                }
            }
            match value {
                Some(v) => vec![(name_node.to_string(), v)],
                None => vec![],
            }
        }
        (Language::Cpp, "preproc_def") => {
            let name_field = node.child_by_field_name("name");
            let value_field = node.child_by_field_name("value");
            match (name_field, value_field) {
                (Some(n), Some(v)) => vec![(text(n, source).to_string(), v)],
                _ => vec![],
            }
        }
        (Language::Cpp, "declaration") => {
            let mut out = Vec::new();
            if let Some(init) = super::walk::find_descendant(node, &["init_declarator"]) {
                if let (Some(decl), Some(val)) =
                (init.child_by_field_name("declarator"), init.child_by_field_name("value"))
                {
                    out.push((text(decl, source).to_string(), val));
                }
            }
            out
        }
        (Language::Lua, "variable_declaration") | (Language::Lua, "assignment_statement") => {
            let vars = node.child_by_field_name("variable_list").or_else(|| node.named_child(0));
            let exprs = node.child_by_field_name("expression_list").or_else(|| node.named_child(1));
            match (vars, exprs) {
                (Some(v), Some(e)) => {
                    let name = v.named_child(0).map(|n| text(n, source)).unwrap_or_else(|| text(v, source));
                    let value = e.named_child(0).unwrap_or(e);
                    vec![(name.to_string(), value)]
                }
                _ => vec![],
            }
        }
        _ => vec![],
    }
}

/// The polymorphic `resolve(expr) -> string` operation from recursive
/// over binary concatenation/coalescing, interpolation forms, string
/// literals, bare identifiers and the recognised call conventions.
fn resolve_value(node: Node, source: &[u8], table: &HashMap<String, String>) -> Option<String> {
    if let (Some(left), Some(right)) = (node.child_by_field_name("left"), node.child_by_field_name("right")) {
        let op = node
            .child_by_field_name("operator")
            .map(|o| text(o, source).to_string())
            .unwrap_or_else(|| infer_operator_text(node, left, right, source));
        return match op.as_str() {
            "+" | "." | ".." => {
                let l = resolve_value(left, source, table).unwrap_or_default();
                let r = resolve_value(right, source, table).unwrap_or_default();
                Some(format!("{l}{r}"))
            }
            "||" | "??" => {
                let l = resolve_value(left, source, table);
                match l {
                    Some(ref s) if !s.is_empty() => l,
                    _ => resolve_value(right, source, table),
                }
            }
            _ => None,
        };
    }

    match node.kind() {
        "identifier" | "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
            let name = text(node, source);
            Some(table.get(name).cloned().unwrap_or_else(|| "{}".to_string()))
        }
        "call" | "call_expression" | "method_invocation" | "invocation_expression" => {
            resolve_call(node, source, table)
        }
        "macro_invocation" => resolve_rust_macro(node, source, table),
        "interpolated_string_expression" => resolve_scala_interpolated(node, source, table),
        _ => {
            if let Some(s) = resolve_interpolated_children(node, source, table) {
                return Some(s);
            }
            let raw = text(node, source);
            let stripped = raw.trim_matches(|c| c == '"' || c == '\'' || c == '`');
            if stripped.len() != raw.len() {
                Some(stripped.to_string())
            } else {
                None
            }
        }
    }
}

/// When a binary node has no named `operator` field, find the operator as
/// the lone unnamed token sitting between `left` and `right`.
fn infer_operator_text(node: Node, left: Node, right: Node, source: &[u8]) -> String {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.start_byte() >= left.end_byte() && child.end_byte() <= right.start_byte() {
            let t = text(child, source).trim();
            if !t.is_empty() {
                return t.to_string();
            }
        }
    }
    String::new()
}

/// Literal-string content and template/f-string/encapsed-string
/// interpolation, all of which share the shape "walk named children,
/// literal-content kinds append verbatim, interpolation kinds substitute a
/// resolved identifier".
fn resolve_interpolated_children(node: Node, source: &[u8], table: &HashMap<String, String>) -> Option<String> {
    let mut out = String::new();
    let mut found = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "string_content" | "string_fragment" | "interpreted_string_literal_content" | "escape_sequence" => {
                out.push_str(text(child, source));
                found = true;
            }
            "interpolation" | "template_substitution" => {
                found = true;
                if let Some(id) = super::walk::find_descendant(child, &["identifier"]) {
                    let name = text(id, source);
                    out.push_str(&table.get(name).cloned().unwrap_or_else(|| "{}".to_string()));
                } else {
                    out.push_str("{}");
                }
            }
            "variable_name" => {
                found = true;
                let name = text(child, source).trim_start_matches('$');
                out.push_str(&table.get(name).cloned().unwrap_or_else(|| "{}".to_string()));
            }
            _ => {}
        }
    }
    found.then_some(out)
}

/// Scala `s"..."`: interpolations are the only typed children; the literal
/// text between them is recovered from source byte gaps.
fn resolve_scala_interpolated(node: Node, source: &[u8], table: &HashMap<String, String>) -> Option<String> {
    let whole = text(node, source);
    let start_quote = whole.find('"')?;
    let end_quote = whole.rfind('"')?;
    if end_quote <= start_quote {
        return None;
    }
    let inner_start = node.start_byte() + start_quote + 1;
    let inner_end = node.start_byte() + end_quote;

    let mut out = String::new();
    let mut last = inner_start;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "interpolation" {
            continue;
        }
        if child.start_byte() > last {
            out.push_str(std::str::from_utf8(&source[last..child.start_byte()]).unwrap_or(""));
        }
        if let Some(id) = super::walk::find_descendant(child, &["identifier"]) {
            let name = text(id, source);
            out.push_str(&table.get(name).cloned().unwrap_or_else(|| "{}".to_string()));
        }
        last = child.end_byte();
    }
    if last < inner_end {
        out.push_str(std::str::from_utf8(&source[last..inner_end]).unwrap_or(""));
    }
    Some(out)
}

/// Call expressions recognised by callee text: `fmt.Sprintf`,
/// `String.format`, `string.format` substitute positional `%s`/`%v`/`%d`;
/// any other call falls back to scanning its arguments for a URL-looking
/// string.
fn resolve_call(node: Node, source: &[u8], table: &HashMap<String, String>) -> Option<String> {
    let callee = node
        .child_by_field_name("function")
        .or_else(|| node.child_by_field_name("name"));
    let callee_text = callee.map(|n| text(n, source)).unwrap_or_default();
    let args: Vec<Node> = node
        .child_by_field_name("arguments")
        .map(|a| {
            let mut c = a.walk();
            a.named_children(&mut c).collect::<Vec<_>>()
    })
        .unwrap_or_default();

    if matches!(callee_text, "fmt.Sprintf" | "String.format" | "string.format") {
        let (fmt_node, rest) = args.split_first()?;
        let fmt_str = resolve_value(*fmt_node, source, table).unwrap_or_default();
        let substituted: Vec<String> = rest
            .iter()
            .map(|a| resolve_value(*a, source, table).unwrap_or_else(|| "{}".to_string()))
            .collect();
        return Some(substitute_percent_placeholders(&fmt_str, &substituted));
    }

    for arg in &args {
        if let Some(v) = resolve_value(*arg, source, table) {
            if v.starts_with("http://") || v.starts_with("https://") {
                return Some(v);
            }
        }
    }
    None
}

/// Rust `format!` macro: first token is the format string, `{}`
/// placeholders take subsequent token arguments in order.
fn resolve_rust_macro(node: Node, source: &[u8], table: &HashMap<String, String>) -> Option<String> {
    let macro_name = node.child_by_field_name("macro").map(|n| text(n, source))?;
    if macro_name != "format" {
        return None;
    }
    let tt = super::walk::find_descendant(node, &["token_tree"])?;
    let mut cursor = tt.walk();
    let children: Vec<Node> = tt.named_children(&mut cursor).collect();
    let (first, rest) = children.split_first()?;
    let fmt_str = resolve_value(*first, source, table).unwrap_or_default();
    let substituted: Vec<String> = rest
        .iter()
        .map(|a| resolve_value(*a, source, table).unwrap_or_else(|| "{}".to_string()))
        .collect();
    Some(substitute_brace_placeholders(&fmt_str, &substituted))
}

fn substitute_percent_placeholders(fmt: &str, args: &[String]) -> String {
    let mut out = String::new();
    let mut iter = args.iter();
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(&spec) = chars.peek() {
                if matches!(spec, 's' | 'v' | 'd') {
                    chars.next();
                    out.push_str(iter.next().map(String::as_str).unwrap_or("{}"));
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn substitute_brace_placeholders(fmt: &str, args: &[String]) -> String {
    let mut out = String::new();
    let mut iter = args.iter();
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'}') {
            chars.next();
            out.push_str(iter.next().map(String::as_str).unwrap_or("{}"));
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language_spec::language_spec;
    use tree_sitter::Parser;

    fn parse(language: Language, source: &str) -> (Vec<u8>, Tree) {
        let ts_lang = match language {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            _ => unreachable!(),
        };
        let mut parser = Parser::new();
        parser.set_language(&ts_lang).unwrap();
        let bytes = source.as_bytes().to_vec();
        let tree = parser.parse(&bytes, None).unwrap();
        (bytes, tree)
    }

    #[test]
    fn python_chained_fstrings_resolve_in_order() {
        let source = "HOST = \"https://api\"\nBASE = f\"{HOST}/v1\"\nENDPOINT = f\"{BASE}/orders\"\n";
        let (bytes, tree) = parse(Language::Python, source);
        let spec = language_spec(Language::Python).unwrap();
        let constants = resolve_module_constants(spec, &bytes, &tree);
        let map: HashMap<_, _> = constants.into_iter().collect();
        assert_eq!(map.get("ENDPOINT"), Some(&"https://api/v1/orders".to_string()));
    }

    #[test]
    fn unknown_identifier_in_fstring_yields_unresolved_marker() {
        let source = "BASE = f\"{MISSING}/v1\"\n";
        let (bytes, tree) = parse(Language::Python, source);
        let spec = language_spec(Language::Python).unwrap();
        let constants = resolve_module_constants(spec, &bytes, &tree);
        let map: HashMap<_, _> = constants.into_iter().collect();
        assert_eq!(map.get("BASE"), Some(&"{}/v1".to_string()));
    }

    #[test]
    fn kotlin_chained_string_concat_resolves() {
        let source = "val host = \"https://api.example.com\"\nval base = host + \"/v1\"\nval endpoint = base + \"/orders\"\n";
        let (bytes, tree) = parse(Language::Kotlin, source);
        let spec = language_spec(Language::Kotlin).unwrap();
        let constants = resolve_module_constants(spec, &bytes, &tree);
        let map: HashMap<_, _> = constants.into_iter().collect();
        assert_eq!(
            map.get("endpoint"),
            Some(&"https://api.example.com/v1/orders".to_string())
        );
    }

    #[test]
    fn go_const_declaration_resolves_literal() {
        let source = "package cfg\nconst DbUrl = \"https://db/\"\n";
        let (bytes, tree) = parse(Language::Go, source);
        let spec = language_spec(Language::Go).unwrap();
        let constants = resolve_module_constants(spec, &bytes, &tree);
        let map: HashMap<_, _> = constants.into_iter().collect();
        assert_eq!(map.get("DbUrl"), Some(&"https://db/".to_string()));
    }
}
