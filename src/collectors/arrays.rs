// ArrayCollector: harvests fully-literal arrays into the name -> elements
// table. An array qualifies only if every element is a string or numeric
// literal; expressions, spreads, and holes disqualify the whole array.

use tracing::debug;
use tree_sitter::Node;

use crate::ast;
use crate::tables::{LiteralValue, SourceTables};

pub struct ArrayCollector<'s> {
    source: &'s str,
}

impl<'s> ArrayCollector<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Observe one node during the collection walk. Bindings of the shape
    /// `name = [..]` (declaration or assignment) are recorded, overwriting
    /// any earlier entry under the same name.
    pub fn inspect<'t>(&self, node: Node<'t>, tables: &mut SourceTables<'t>) {
        let (target, value) = match node.kind() {
            "variable_declarator" => (
                node.child_by_field_name("name"),
                node.child_by_field_name("value"),
            ),
            "assignment_expression" => (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ),
            _ => return,
        };
        let (Some(target), Some(value)) = (target, value) else {
            return;
        };
        let Some(name) = ast::identifier_name(&target, self.source) else {
            return;
        };
        if value.kind() != "array" {
            return;
        }
        if let Some(elements) = self.literal_elements(value) {
            debug!(target: "keyhunt::collectors", array = %name, len = elements.len(), "collected literal array");
            tables.arrays.insert(name, elements);
        }
    }

    /// Elements of an array literal if all of them are literals and the
    /// literal has no holes. Comments inside the brackets are ignored.
    fn literal_elements(&self, array: Node<'_>) -> Option<Vec<LiteralValue>> {
        let mut elements = Vec::new();
        let mut expect_element = true;
        let mut cursor = array.walk();
        for child in array.children(&mut cursor) {
            match child.kind() {
                "[" | "]" | "comment" => {}
                "," => {
                    // A comma arriving where an element was due is a hole.
                    if expect_element {
                        return None;
                    }
                    expect_element = true;
                }
                "string" => {
                    elements.push(LiteralValue::Str(ast::string_value(&child, self.source)?));
                    expect_element = false;
                }
                "number" => {
                    elements.push(LiteralValue::Num(ast::number_value(&child, self.source)?));
                    expect_element = false;
                }
                _ => return None,
            }
        }
        Some(elements)
    }
}
