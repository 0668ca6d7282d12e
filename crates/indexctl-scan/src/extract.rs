//! Recognition of query call-chains in a parsed source file.
//!
//! The walk matches three call shapes by method name: filters
//! (`where`), sorts (`orderBy`) and collection references
//! (`collection` / `collectionGroup`), in both member style
//! (`db.collection("users").where(...)`) and modular style
//! (`query(collection(db, "users"), where(...))`). Collection
//! attribution inspects the enclosing call expressions upward, bounded
//! by the enclosing statement; chains the walk cannot resolve keep
//! `collection: None`.

use crate::error::ScanError;
use crate::language::{parse_source, SourceLang};
use indexctl_core::model::{FieldOrder, OperationKind, QueryOperation};
use std::path::Path;
use tree_sitter::Node;

const FILTER_METHODS: &[&str] = &["where"];
const SORT_METHODS: &[&str] = &["orderBy"];
const COLLECTION_METHODS: &[&str] = &["collection", "collectionGroup"];

/// Node kinds the attribution walk never climbs past.
const ATTRIBUTION_BOUNDARIES: &[&str] = &[
    "program",
    "statement_block",
    "expression_statement",
    "lexical_declaration",
    "variable_declaration",
    "return_statement",
    "arrow_function",
    "function_declaration",
    "function_expression",
    "method_definition",
    "class_body",
];

/// Extract every filter and sort operation from one source file.
pub fn extract_file(
    source: &str,
    file: &Path,
    lang: SourceLang,
) -> Result<Vec<QueryOperation>, ScanError> {
    let tree = parse_source(lang, source).map_err(|message| ScanError::Parse {
        file: file.to_path_buf(),
        message,
    })?;

    let mut operations = Vec::new();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if node.kind() == "call_expression" {
            if let Some(op) = match_operation(node, source, file) {
                operations.push(op);
            }
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            stack.push(child);
        }
    }

    // DFS with a stack visits later siblings first; report in source order.
    operations.sort_by_key(|op| op.line);
    Ok(operations)
}

fn match_operation(call: Node<'_>, source: &str, file: &Path) -> Option<QueryOperation> {
    let (name, name_node) = callee_name(call, source)?;
    let args = call_arguments(call);
    let field_path = args.first().and_then(|arg| string_literal(*arg, source))?;

    let kind = if FILTER_METHODS.contains(&name.as_str()) && args.len() >= 2 {
        let operator = string_literal(args[1], source)
            .or_else(|| node_text(args[1], source).map(str::to_string))?;
        OperationKind::Filter { operator }
    } else if SORT_METHODS.contains(&name.as_str()) {
        let direction = args
            .get(1)
            .and_then(|arg| string_literal(*arg, source))
            .map(|raw| parse_direction(&raw))
            .unwrap_or(FieldOrder::Ascending);
        OperationKind::Sort { direction }
    } else {
        return None;
    };

    Some(QueryOperation {
        file: file.to_path_buf(),
        // The method name's own line, so each call of a multi-line chain
        // keeps a distinct location.
        line: name_node.start_position().row + 1,
        kind,
        field_path,
        collection: attribute_collection(call, source),
    })
}

fn parse_direction(raw: &str) -> FieldOrder {
    if raw.eq_ignore_ascii_case("desc") || raw.eq_ignore_ascii_case("descending") {
        FieldOrder::Descending
    } else {
        FieldOrder::Ascending
    }
}

/// Walk enclosing nodes upward; at each enclosing call expression,
/// search its subtree for the nearest collection-reference call.
fn attribute_collection(op_call: Node<'_>, source: &str) -> Option<String> {
    let mut current = Some(op_call);
    while let Some(node) = current {
        if ATTRIBUTION_BOUNDARIES.contains(&node.kind()) {
            break;
        }
        if node.kind() == "call_expression" {
            if let Some(name) = collection_ref_in(node, source) {
                return Some(name);
            }
        }
        current = node.parent();
    }
    None
}

fn collection_ref_in(root: Node<'_>, source: &str) -> Option<String> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "call_expression" {
            if let Some((name, _)) = callee_name(node, source) {
                if COLLECTION_METHODS.contains(&name.as_str()) {
                    // Member style puts the name first, modular style
                    // passes the handle first; take the first string
                    // literal either way.
                    if let Some(found) = call_arguments(node)
                        .into_iter()
                        .find_map(|arg| string_literal(arg, source))
                    {
                        return Some(found);
                    }
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            stack.push(child);
        }
    }
    None
}

fn callee_name<'a>(call: Node<'a>, source: &str) -> Option<(String, Node<'a>)> {
    let func = call.child_by_field_name("function")?;
    match func.kind() {
        "member_expression" => {
            let prop = func.child_by_field_name("property")?;
            Some((node_text(prop, source)?.to_string(), prop))
        }
        "identifier" => Some((node_text(func, source)?.to_string(), func)),
        _ => None,
    }
}

fn call_arguments<'a>(call: Node<'a>) -> Vec<Node<'a>> {
    let Some(args) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = args.walk();
    args.named_children(&mut cursor)
        .filter(|node| node.kind() != "comment")
        .collect()
}

fn string_literal(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_fragment" | "escape_sequence" => out.push_str(node_text(child, source)?),
            _ => {}
        }
    }
    Some(out)
}

fn node_text<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}
