//! Small tree-sitter node helpers shared by extraction, inference and
//! resolution. Kept free of any domain/application types so it can be unit
//! tested in isolation from the rest of the backend.

use tree_sitter::Node;

pub fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Finds a node's "name" the generic, field-first way: the `name` field if
/// the grammar exposes one, else the first named child whose own kind looks
/// like an identifier.
pub fn declaration_name<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
    if let Some(n) = node.child_by_field_name("name") {
        return Some(text(n, source));
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let kind = child.kind();
        if kind.ends_with("identifier") || kind == "name" || kind == "constant" {
            return Some(text(child, source));
        }
    }
    None
}

/// Resolves a (possibly dotted, e.g. C/C++ `declarator.parameters`) field
/// path against `node`, trying each candidate in order.
pub fn field_path<'a>(node: Node<'a>, path: &str) -> Option<Node<'a>> {
    let mut current = node;
    for segment in path.split('.') {
        current = current.child_by_field_name(segment)?;
    }
    Some(current)
}

pub fn first_field<'a>(node: Node<'a>, fields: &[&str]) -> Option<Node<'a>> {
    fields.iter().find_map(|f| field_path(node, f))
}

/// Counts descendants (the node itself excluded) whose kind matches one of
/// `kinds`.
pub fn count_descendant_kinds(node: Node, kinds: &[&str]) -> usize {
    let mut count = 0;
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if kinds.contains(&child.kind()) {
                count += 1;
            }
            count += count_descendant_kinds(child, kinds);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    count
}

/// Finds the first descendant (including `node` itself) whose kind is in
/// `kinds`, depth-first.
pub fn find_descendant<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    if kinds.contains(&node.kind()) {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_descendant(child, kinds) {
            return Some(found);
        }
    }
    None
}

pub fn all_descendants<'a>(node: Node<'a>, kinds: &[&str], out: &mut Vec<Node<'a>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            out.push(child);
        }
        all_descendants(child, kinds, out);
    }
}

/// Cleans a raw type-annotation fragment per: strip leading `*`, `&`,
/// `[]`, `...`, a leading `: `, and drop everything from the first `<`/`[`.
pub fn clean_type(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(stripped) = s.strip_prefix(": ") {
        s = stripped;
    }
    let s = s.trim_start_matches(['*', '&']).trim_start_matches("...").trim();
    let s = s.trim_start_matches("[]").trim();
    let end = s.find(['<', '[']).unwrap_or(s.len());
    s[..end].trim().to_string()
}

/// The enclosing declaration's qualified name, found by walking parent
/// pointers upward until a node kind in `container_kinds` is found whose
/// `name` this caller already knows how to map back to a QN via `qn_of`.
pub fn enclosing<'a>(node: Node<'a>, container_kinds: &[&str]) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if container_kinds.contains(&n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_type_strips_pointer_and_generics() {
        assert_eq!(clean_type("*Foo"), "Foo");
        assert_eq!(clean_type("&str"), "str");
        assert_eq!(clean_type("Vec<String>"), "Vec");
        assert_eq!(clean_type(": number"), "number");
        assert_eq!(clean_type("...string"), "string");
    }
}
