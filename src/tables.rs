// Symbol tables built by the collection phase.
//
// The tables are the explicit replacement for runtime binding resolution:
// they are populated once from the whole program tree (last write wins on
// redeclaration), then passed by shared reference into every extractor and
// never mutated again.

use std::collections::HashMap;

use serde::Serialize;
use tree_sitter::Node;

use crate::report::CollectionStats;

/// A fully-literal array element: string or number, nothing else qualifies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Str(String),
    Num(f64),
}

impl LiteralValue {
    /// Usable as an array index: a non-negative integral number, or a
    /// string holding the canonical decimal form of one, which JS coerces
    /// the same way when it appears as a subscript.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            LiteralValue::Num(n) if n.fract() == 0.0 && *n >= 0.0 && *n < usize::MAX as f64 => {
                Some(*n as usize)
            }
            LiteralValue::Str(s) => {
                let parsed = s.parse::<usize>().ok()?;
                (parsed.to_string() == *s).then_some(parsed)
            }
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Num(n) => Some(*n),
            LiteralValue::Str(_) => None,
        }
    }

    /// Render the way `Array.prototype.join` coerces this element:
    /// strings verbatim, integer-valued numbers without a decimal point.
    pub fn join_piece(&self) -> String {
        match self {
            LiteralValue::Str(s) => s.clone(),
            LiteralValue::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

/// A function whose only relevant behavior is returning one fixed string.
#[derive(Debug, Clone)]
pub struct SegmentFunction<'t> {
    /// The string literal the function returns.
    pub value: String,
    /// The function/arrow node that defines it.
    pub definition: Node<'t>,
}

/// Where a callable identifier got its function value. A declaration or
/// variable initializer takes precedence; otherwise the most recent
/// function-valued assignment in the identifier's write history applies.
#[derive(Debug, Clone, Default)]
pub struct CallableDef<'t> {
    pub declared: Option<Node<'t>>,
    pub assigned: Option<Node<'t>>,
}

impl<'t> CallableDef<'t> {
    pub fn resolve(&self) -> Option<Node<'t>> {
        self.declared.or(self.assigned)
    }
}

/// All lookup tables produced by the collection phase.
#[derive(Debug, Default)]
pub struct SourceTables<'t> {
    /// Literal arrays: name -> ordered elements.
    pub arrays: HashMap<String, Vec<LiteralValue>>,
    /// Segment functions: name -> literal value + definition.
    pub segments: HashMap<String, SegmentFunction<'t>>,
    /// Numeric constants: identifier bound directly to a numeric literal.
    pub constants: HashMap<String, f64>,
    /// Direct identifier-to-identifier bindings (`S = b3`).
    pub aliases: HashMap<String, String>,
    /// Object-literal property maps: object -> property -> value expression
    /// or method node.
    pub objects: HashMap<String, HashMap<String, Node<'t>>>,
    /// Callable definitions for identifier-named functions.
    pub callables: HashMap<String, CallableDef<'t>>,
}

impl<'t> SourceTables<'t> {
    /// Follow alias edges to the final referent. Chains are capped so an
    /// alias cycle cannot spin forever.
    pub fn resolve_alias<'n>(&'n self, name: &'n str) -> &'n str {
        let mut current = name;
        for _ in 0..8 {
            match self.aliases.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Segment function for a callee name, directly or through aliases.
    pub fn resolve_segment(&self, name: &str) -> Option<&SegmentFunction<'t>> {
        self.segments
            .get(name)
            .or_else(|| self.segments.get(self.resolve_alias(name)))
    }

    /// Callable definition for a name, directly or through aliases.
    pub fn resolve_callable(&self, name: &str) -> Option<Node<'t>> {
        self.callables
            .get(name)
            .or_else(|| self.callables.get(self.resolve_alias(name)))
            .and_then(|def| def.resolve())
    }

    /// Object property value node, following aliases on the object name.
    pub fn object_property(&self, object: &str, property: &str) -> Option<Node<'t>> {
        self.objects
            .get(object)
            .or_else(|| self.objects.get(self.resolve_alias(object)))
            .and_then(|props| props.get(property))
            .copied()
    }

    /// Elements of a named array if every one of them is numeric.
    pub fn numeric_array(&self, name: &str) -> Option<Vec<f64>> {
        self.arrays
            .get(name)?
            .iter()
            .map(LiteralValue::as_number)
            .collect()
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            array_count: self.arrays.len(),
            segment_function_count: self.segments.len(),
            numeric_constant_count: self.constants.len(),
        }
    }
}
