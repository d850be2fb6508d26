// SegmentFunctionCollector: harvests string-returning functions, numeric
// constants, alias edges, object-property maps, and the callable-definition
// table used for binding resolution during extraction.
//
// A function "returns a string" iff its body is a bare string literal
// (concise arrow) or a block whose first directly-owned return statement
// returns a string literal. Returns of nested functions never count.

use std::collections::HashMap;

use tracing::debug;
use tree_sitter::Node;

use crate::ast;
use crate::tables::{SegmentFunction, SourceTables};

pub struct SegmentFunctionCollector<'s> {
    source: &'s str,
}

impl<'s> SegmentFunctionCollector<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Observe one node during the collection walk.
    pub fn inspect<'t>(&self, node: Node<'t>, tables: &mut SourceTables<'t>) {
        match node.kind() {
            "function_declaration" => {
                let Some(name_node) = node.child_by_field_name("name") else {
                    return;
                };
                let Some(name) = ast::identifier_name(&name_node, self.source) else {
                    return;
                };
                self.record_callable(&name, node, true, tables);
                self.record_if_segment(&name, node, tables);
            }
            "variable_declarator" => {
                let Some(target) = node.child_by_field_name("name") else {
                    return;
                };
                let Some(name) = ast::identifier_name(&target, self.source) else {
                    return;
                };
                let Some(value) = node.child_by_field_name("value") else {
                    return;
                };
                self.record_binding(&name, value, true, tables);
            }
            "assignment_expression" => {
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return;
                };
                if let Some(name) = ast::identifier_name(&left, self.source) {
                    self.record_binding(&name, right, false, tables);
                } else {
                    self.record_property_assignment(left, right, tables);
                }
            }
            _ => {}
        }
    }

    /// A `name = value` binding, from a declarator (`declared`) or a plain
    /// assignment. Dispatches on the value's shape.
    fn record_binding<'t>(
        &self,
        name: &str,
        value: Node<'t>,
        declared: bool,
        tables: &mut SourceTables<'t>,
    ) {
        if ast::is_function_value(&value) {
            self.record_callable(name, value, declared, tables);
            self.record_if_segment(name, value, tables);
        } else if value.kind() == "number" {
            if let Some(constant) = ast::number_value(&value, self.source) {
                debug!(target: "keyhunt::collectors", name, constant, "collected numeric constant");
                tables.constants.insert(name.to_string(), constant);
            }
        } else if value.kind() == "identifier" {
            let referent = ast::node_text(&value, self.source).to_string();
            debug!(target: "keyhunt::collectors", alias = name, to = %referent, "collected alias");
            tables.aliases.insert(name.to_string(), referent);
        } else if value.kind() == "object" {
            // A fresh object literal replaces any earlier map for the name.
            let props = self.object_literal_properties(value);
            debug!(target: "keyhunt::collectors", object = name, properties = props.len(), "collected object literal");
            tables.objects.insert(name.to_string(), props);
        }
    }

    /// `obj.prop = expr` / `obj["prop"] = expr`: update the property map for
    /// the object name in place.
    fn record_property_assignment<'t>(
        &self,
        left: Node<'t>,
        right: Node<'t>,
        tables: &mut SourceTables<'t>,
    ) {
        let Some(object) = ast::member_object(&left) else {
            return;
        };
        let Some(object_name) = ast::identifier_name(&object, self.source) else {
            return;
        };
        let Some(property) = ast::member_property_name(&left, self.source) else {
            return;
        };
        debug!(target: "keyhunt::collectors", object = %object_name, property = %property, "collected assigned property");
        tables
            .objects
            .entry(object_name)
            .or_default()
            .insert(property, right);
    }

    /// Properties and methods of an object literal, keyed by resolvable
    /// string or identifier keys. Unresolvable keys are skipped.
    fn object_literal_properties<'t>(&self, object: Node<'t>) -> HashMap<String, Node<'t>> {
        let mut props = HashMap::new();
        let mut cursor = object.walk();
        for child in object.named_children(&mut cursor) {
            match child.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (
                        child.child_by_field_name("key"),
                        child.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    if let Some(key) = self.property_key_name(key) {
                        props.insert(key, value);
                    }
                }
                "method_definition" => {
                    let Some(key) = child.child_by_field_name("name") else {
                        continue;
                    };
                    if let Some(key) = self.property_key_name(key) {
                        // The whole method node stands in for the value.
                        props.insert(key, child);
                    }
                }
                _ => {}
            }
        }
        props
    }

    fn property_key_name(&self, key: Node<'_>) -> Option<String> {
        match key.kind() {
            "property_identifier" | "identifier" => {
                Some(ast::node_text(&key, self.source).to_string())
            }
            "string" => ast::string_value(&key, self.source),
            _ => None,
        }
    }

    fn record_callable<'t>(
        &self,
        name: &str,
        func: Node<'t>,
        declared: bool,
        tables: &mut SourceTables<'t>,
    ) {
        let entry = tables.callables.entry(name.to_string()).or_default();
        if declared {
            entry.declared = Some(func);
        } else {
            entry.assigned = Some(func);
        }
    }

    fn record_if_segment<'t>(&self, name: &str, func: Node<'t>, tables: &mut SourceTables<'t>) {
        if let Some(value) = string_return_value(func, self.source) {
            debug!(target: "keyhunt::collectors", segment = name, "collected segment function");
            tables.segments.insert(
                name.to_string(),
                SegmentFunction {
                    value,
                    definition: func,
                },
            );
        }
    }
}

/// The fixed string a function returns, if it is a segment function: either
/// a concise arrow body that is itself a string literal, or the first
/// directly-owned return statement whose argument is a string literal.
pub fn string_return_value(func: Node<'_>, source: &str) -> Option<String> {
    let body = func.child_by_field_name("body")?;
    if body.kind() == "string" {
        return ast::string_value(&body, source);
    }
    if body.kind() != "statement_block" {
        return None;
    }
    for ret in ast::direct_returns(func) {
        let Some(argument) = ast::return_argument(&ret) else {
            continue;
        };
        let argument = ast::strip_parens(argument);
        if let Some(value) = ast::string_value(&argument, source) {
            return Some(value);
        }
    }
    None
}
