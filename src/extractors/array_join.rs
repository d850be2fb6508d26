// ArrayJoinExtractor: resolves the "index array mapped through a string
// array then joined" pattern:
//
//     IDX.map(i => STR[i]).join("")
//
// Both arrays must already be in the array table. Join semantics are
// reproduced explicitly: out-of-range or otherwise unusable index values
// contribute an empty string, the way native join renders `undefined`.

use tracing::debug;
use tree_sitter::Node;

use crate::ast;
use crate::report::{Candidate, Provenance, Strategy};
use crate::tables::{LiteralValue, SourceTables};

pub struct ArrayJoinExtractor<'a, 't> {
    source: &'a str,
    tables: &'a SourceTables<'t>,
}

impl<'a, 't> ArrayJoinExtractor<'a, 't> {
    pub fn new(source: &'a str, tables: &'a SourceTables<'t>) -> Self {
        Self { source, tables }
    }

    /// Try the whole pattern against one call expression. Every mismatch is
    /// a silent skip; at most one candidate comes out.
    pub fn match_call(&self, call: Node<'t>) -> Option<Candidate> {
        if call.kind() != "call_expression" {
            return None;
        }
        let callee = call.child_by_field_name("function")?;
        if ast::member_property_name(&callee, self.source)? != "join" {
            return None;
        }
        if !self.join_separator_is_empty(&call) {
            return None;
        }

        // The joined value must itself be a `.map(cb)` call on a collected
        // identifier with a single one-parameter callback.
        let map_call = ast::strip_parens(ast::member_object(&callee)?);
        if map_call.kind() != "call_expression" {
            return None;
        }
        let map_callee = map_call.child_by_field_name("function")?;
        if ast::member_property_name(&map_callee, self.source)? != "map" {
            return None;
        }
        let index_node = ast::member_object(&map_callee)?;
        let index_name = ast::identifier_name(&index_node, self.source)?;
        let index_values = self.tables.arrays.get(&index_name)?;

        let callbacks = ast::call_arguments(&map_call);
        let [callback] = callbacks.as_slice() else {
            return None;
        };
        if !ast::is_function_value(callback) {
            return None;
        }
        let param = ast::single_parameter_name(callback, self.source)?;
        let string_name = self.callback_pool_name(*callback, &param)?;
        let string_values = self.tables.arrays.get(&string_name)?;

        let value = join_through(index_values, string_values);
        debug!(
            target: "keyhunt::extractors",
            index_array = %index_name,
            string_array = %string_name,
            len = value.len(),
            "array-join candidate"
        );
        Some(Candidate {
            value,
            strategy: Strategy::ArrayJoin,
            provenance: Provenance::ArrayJoin {
                index_array: index_name,
                string_array: string_name,
                index_values: index_values.clone(),
                string_values: string_values.clone(),
            },
        })
    }

    /// `.join()` with no argument, or exactly one empty string literal.
    fn join_separator_is_empty(&self, call: &Node<'t>) -> bool {
        let args = ast::call_arguments(call);
        match args.as_slice() {
            [] => true,
            [sep] => ast::string_value(sep, self.source).is_some_and(|s| s.is_empty()),
            _ => false,
        }
    }

    /// Name of the string array inside the callback: its body (expression
    /// or block with a qualifying return) must be `POOL[param]`.
    fn callback_pool_name(&self, callback: Node<'t>, param: &str) -> Option<String> {
        let body = callback.child_by_field_name("body")?;
        if body.kind() == "statement_block" {
            for ret in ast::direct_returns(callback) {
                let Some(argument) = ast::return_argument(&ret) else {
                    continue;
                };
                let argument = ast::strip_parens(argument);
                if let Some(name) = self.pool_subscript_name(argument, param) {
                    return Some(name);
                }
            }
            None
        } else {
            self.pool_subscript_name(ast::strip_parens(body), param)
        }
    }

    fn pool_subscript_name(&self, expr: Node<'t>, param: &str) -> Option<String> {
        if expr.kind() != "subscript_expression" {
            return None;
        }
        let object = expr.child_by_field_name("object")?;
        let index = expr.child_by_field_name("index")?;
        if ast::identifier_name(&index, self.source)? != param {
            return None;
        }
        ast::identifier_name(&object, self.source)
    }
}

/// Map each index through the pool and concatenate with no separator.
/// Anything that is not a usable in-range index contributes an empty
/// string, mirroring native array-join coercion of `undefined`.
pub fn join_through(index: &[LiteralValue], pool: &[LiteralValue]) -> String {
    let mut out = String::new();
    for value in index {
        if let Some(piece) = value.as_index().and_then(|i| pool.get(i)) {
            out.push_str(&piece.join_piece());
        }
    }
    out
}
