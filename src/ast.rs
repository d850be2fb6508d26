// Shared tree-sitter helpers for the key-recovery passes.
//
// The collectors and extractors all speak in terms of tree-sitter-javascript
// node kinds; this module centralizes parsing, literal decoding, and the
// small navigation helpers they share.

use tree_sitter::{Node, Parser, Tree};

use crate::error::{ExtractError, Result};

/// Parse JavaScript source text into a tree.
///
/// A missing tree is fatal and propagates to the caller before any
/// collection runs. Recoverable ERROR nodes inside an otherwise parsed tree
/// are tolerated; they simply never match any pattern.
pub fn parse_program(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_javascript::LANGUAGE.into())?;
    parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::Parse("parser produced no tree".to_string()))
}

/// Raw source text covered by a node.
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Preorder walk over a subtree. The callback returns `false` to stop the
/// whole walk (the non-exhaustive stop policy); collectors always continue.
pub fn visit_while<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>) -> bool) -> bool {
    if !f(node) {
        return false;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !visit_while(child, f) {
            return false;
        }
    }
    true
}

/// Unwrap `(((expr)))` down to the inner expression.
pub fn strip_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Identifier name, or None for any other node kind.
pub fn identifier_name(node: &Node, source: &str) -> Option<String> {
    if node.kind() == "identifier" {
        Some(node_text(node, source).to_string())
    } else {
        None
    }
}

/// True for nodes that denote a function value (not a declaration).
pub fn is_function_value(node: &Node) -> bool {
    matches!(
        node.kind(),
        "function_expression" | "function" | "arrow_function" | "generator_function"
    )
}

/// True for any node that owns its `return` statements.
pub fn is_function_like(node: &Node) -> bool {
    matches!(
        node.kind(),
        "function_declaration"
            | "function_expression"
            | "function"
            | "arrow_function"
            | "generator_function"
            | "generator_function_declaration"
            | "method_definition"
    )
}

/// Decode a string literal node ("string") into its runtime value,
/// concatenating fragments and resolving escape sequences.
pub fn string_value(node: &Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_fragment" => out.push_str(node_text(&child, source)),
            "escape_sequence" => out.push_str(&decode_escape(node_text(&child, source))),
            _ => {}
        }
    }
    Some(out)
}

fn decode_escape(seq: &str) -> String {
    let mut chars = seq.chars();
    if chars.next() != Some('\\') {
        return seq.to_string();
    }
    match chars.next() {
        Some('n') => "\n".to_string(),
        Some('t') => "\t".to_string(),
        Some('r') => "\r".to_string(),
        Some('b') => "\u{8}".to_string(),
        Some('f') => "\u{c}".to_string(),
        Some('v') => "\u{b}".to_string(),
        Some('0') => "\0".to_string(),
        Some('x') => {
            let hex: String = chars.take(2).collect();
            code_to_string(u32::from_str_radix(&hex, 16).ok())
        }
        Some('u') => {
            let rest: String = chars.collect();
            let hex = if let Some(braced) = rest.strip_prefix('{') {
                braced.trim_end_matches('}').to_string()
            } else {
                rest
            };
            code_to_string(u32::from_str_radix(&hex, 16).ok())
        }
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn code_to_string(code: Option<u32>) -> String {
    code.and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_default()
}

/// Parse a numeric literal node ("number"): decimal, float, and the
/// 0x / 0o / 0b prefixed forms the obfuscators favor.
pub fn number_value(node: &Node, source: &str) -> Option<f64> {
    if node.kind() != "number" {
        return None;
    }
    let text = node_text(node, source).replace('_', "");
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return i64::from_str_radix(oct, 8).ok().map(|v| v as f64);
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok().map(|v| v as f64);
    }
    lower.trim_end_matches('n').parse::<f64>().ok()
}

/// Resolved property name of a member access: `obj.prop` or `obj["prop"]`.
/// Computed access through anything but a string literal is unresolvable.
pub fn member_property_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "member_expression" => {
            let property = node.child_by_field_name("property")?;
            if property.kind() == "property_identifier" {
                Some(node_text(&property, source).to_string())
            } else {
                None
            }
        }
        "subscript_expression" => {
            let index = node.child_by_field_name("index")?;
            string_value(&index, source)
        }
        _ => None,
    }
}

/// Object side of a member or subscript access.
pub fn member_object<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    match node.kind() {
        "member_expression" | "subscript_expression" => node.child_by_field_name("object"),
        _ => None,
    }
}

/// The single parameter name of a callback, for both `x => ...` and
/// `function (x) { ... }` shapes. None unless there is exactly one plain
/// identifier parameter.
pub fn single_parameter_name(func: &Node, source: &str) -> Option<String> {
    if let Some(param) = func.child_by_field_name("parameter") {
        return identifier_name(&param, source);
    }
    let params = func.child_by_field_name("parameters")?;
    let mut cursor = params.walk();
    let named: Vec<Node> = params.named_children(&mut cursor).collect();
    match named.as_slice() {
        [only] => identifier_name(only, source),
        _ => None,
    }
}

/// Return statements directly owned by `func`, in document order; returns
/// belonging to nested functions are not included.
pub fn direct_returns<'t>(func: Node<'t>) -> Vec<Node<'t>> {
    let mut returns = Vec::new();
    let Some(body) = func.child_by_field_name("body") else {
        return returns;
    };
    let mut walker = |node: Node<'t>| -> bool {
        if node.kind() == "return_statement" && owner_function(node).map(|o| o.id()) == Some(func.id())
        {
            returns.push(node);
        }
        true
    };
    visit_while(body, &mut walker);
    returns
}

/// Nearest enclosing function-like ancestor of a node.
pub fn owner_function(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if is_function_like(&parent) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Expression produced by a return statement, if any.
pub fn return_argument<'t>(ret: &Node<'t>) -> Option<Node<'t>> {
    ret.named_child(0)
}

/// Named argument nodes of a call expression.
pub fn call_arguments<'t>(call: &Node<'t>) -> Vec<Node<'t>> {
    let Some(args) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = args.walk();
    args.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}
