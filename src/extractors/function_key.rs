// FunctionKeyExtractor: strategies that reconstruct a key out of a
// resolved callable or a bare char-code construction.
//
// 1. Concatenation: the callable's single return is a `+`-chain whose
//    leaves are string literals or calls resolving (directly, through an
//    alias edge, or through an object-property map) to segment functions.
//    One unresolved leaf aborts the candidate; there are no partial keys.
// 2. Explicit char-code transform: `String.fromCharCode(...A.map(cb))`
//    where cb applies one binary operator between its parameter and a
//    collected numeric constant. The site may be a callable's return or a
//    standalone expression (variable initializer, assignment, statement).
// 3. Brute force: only when no qualifying explicit binary exists,
//    enumerate (operator, constant) pairs against the same array and
//    accept the first combination that yields a 64-character hex string.

use std::collections::HashSet;

use tracing::debug;
use tree_sitter::Node;

use crate::ast;
use crate::collectors::segments::string_return_value;
use crate::report::{Candidate, Provenance, Strategy};
use crate::tables::SourceTables;
use crate::validator::{KeyClass, classify};

/// Operators the explicit transform accepts.
const EXPLICIT_OPERATORS: [char; 5] = ['^', '-', '+', '*', '/'];
/// Operators the brute-force fallback enumerates.
const BRUTE_FORCE_OPERATORS: [char; 3] = ['^', '+', '-'];

pub struct FunctionKeyExtractor<'a, 't> {
    source: &'a str,
    tables: &'a SourceTables<'t>,
    /// Nodes already analyzed (callables and char-code call sites), so a
    /// construction reached through more than one dispatch path yields one
    /// candidate only.
    analyzed: HashSet<usize>,
}

impl<'a, 't> FunctionKeyExtractor<'a, 't> {
    pub fn new(source: &'a str, tables: &'a SourceTables<'t>) -> Self {
        Self {
            source,
            tables,
            analyzed: HashSet::new(),
        }
    }

    /// Dispatch for function-defining nodes: declarations, variable
    /// initializers, and function-valued assignments.
    pub fn match_definition(&mut self, node: Node<'t>) -> Option<Candidate> {
        let (name_node, func) = match node.kind() {
            "function_declaration" => (node.child_by_field_name("name")?, node),
            "variable_declarator" => {
                let value = node.child_by_field_name("value")?;
                if !ast::is_function_value(&value) {
                    return None;
                }
                (node.child_by_field_name("name")?, value)
            }
            "assignment_expression" => {
                let right = node.child_by_field_name("right")?;
                if !ast::is_function_value(&right) {
                    return None;
                }
                (node.child_by_field_name("left")?, right)
            }
            _ => return None,
        };
        let name = ast::identifier_name(&name_node, self.source)?;
        self.analyze(&name, func)
    }

    /// Dispatch for call sites. An identifier callee is resolved the way
    /// bindings are resolved everywhere (declaration, initializer, or the
    /// most recent function-valued assignment) and the callable it names
    /// is analyzed. A member callee is checked for the char-code shape
    /// directly, so the construction also matches as a bare expression
    /// rather than only as the return of a callable.
    pub fn match_call(&mut self, call: Node<'t>) -> Option<Candidate> {
        if call.kind() != "call_expression" {
            return None;
        }
        let callee = call.child_by_field_name("function")?;
        if let Some(name) = ast::identifier_name(&callee, self.source) {
            let func = self.tables.resolve_callable(&name)?;
            return self.analyze(&name, func);
        }
        let site = self.match_from_char_code(call)?;
        if !self.analyzed.insert(call.id()) {
            return None;
        }
        self.char_code(&site)
    }

    fn analyze(&mut self, name: &str, func: Node<'t>) -> Option<Candidate> {
        if !self.analyzed.insert(func.id()) {
            return None;
        }
        let returned = ast::strip_parens(self.returned_expression(func)?);
        match returned.kind() {
            "binary_expression" => self.concatenation(name, returned),
            "call_expression" => {
                if let Some(site) = self.match_from_char_code(returned) {
                    // The walk also visits this call node directly; claim
                    // it so the site is reported once.
                    self.analyzed.insert(returned.id());
                    self.char_code(&site)
                } else {
                    // Degenerate chain: a single resolvable segment call.
                    self.concatenation(name, returned)
                }
            }
            _ => None,
        }
    }

    /// Strategies 2 and 3 against one matched char-code site. A qualifying
    /// explicit binary settles the site even when its arithmetic rejects
    /// the candidate; the brute-force fallback runs only when no such
    /// binary exists.
    fn char_code(&self, site: &CharCodeSite<'t>) -> Option<Candidate> {
        match self.qualify_explicit(site) {
            Some(binary) => self.explicit_candidate(site, &binary),
            None => self.brute_force(site),
        }
    }

    /// The one expression a callable produces: a concise arrow body, or the
    /// argument of its single directly-owned return statement.
    fn returned_expression(&self, func: Node<'t>) -> Option<Node<'t>> {
        let body = func.child_by_field_name("body")?;
        if body.kind() != "statement_block" {
            return Some(body);
        }
        let returns = ast::direct_returns(func);
        let [only] = returns.as_slice() else {
            return None;
        };
        ast::return_argument(only)
    }

    // --- Strategy 1: concatenation of segments ---

    fn concatenation(&self, assembler: &str, chain: Node<'t>) -> Option<Candidate> {
        let mut parts = Vec::new();
        let mut components = Vec::new();
        if !self.flatten_chain(chain, &mut parts, &mut components) || parts.is_empty() {
            return None;
        }
        let value = parts.concat();
        debug!(
            target: "keyhunt::extractors",
            assembler,
            components = components.len(),
            len = value.len(),
            "concatenation candidate"
        );
        Some(Candidate {
            value,
            strategy: Strategy::Concatenation,
            provenance: Provenance::Concatenation {
                assembler: assembler.to_string(),
                components,
            },
        })
    }

    /// Flatten a nested `+`-chain left-to-right. Returns false as soon as
    /// any leaf fails to resolve, aborting the candidate entirely.
    fn flatten_chain(
        &self,
        node: Node<'t>,
        parts: &mut Vec<String>,
        components: &mut Vec<String>,
    ) -> bool {
        let node = ast::strip_parens(node);
        match node.kind() {
            "binary_expression" => {
                let (Some(op), Some(left), Some(right)) = (
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return false;
                };
                if ast::node_text(&op, self.source) != "+" {
                    return false;
                }
                self.flatten_chain(left, parts, components)
                    && self.flatten_chain(right, parts, components)
            }
            "string" => match ast::string_value(&node, self.source) {
                Some(value) => {
                    components.push(format!("\"{value}\""));
                    parts.push(value);
                    true
                }
                None => false,
            },
            "call_expression" => match self.resolve_segment_call(node) {
                Some((value, label)) => {
                    components.push(label);
                    parts.push(value);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// The literal a segment call contributes. The callee may be a plain
    /// identifier (directly or via alias edges), or a property access
    /// resolving through the object-property map to a segment function or
    /// method.
    fn resolve_segment_call(&self, call: Node<'t>) -> Option<(String, String)> {
        let callee = ast::strip_parens(call.child_by_field_name("function")?);
        match callee.kind() {
            "identifier" => {
                let name = ast::node_text(&callee, self.source);
                let segment = self.tables.resolve_segment(name)?;
                Some((segment.value.clone(), format!("{name}()")))
            }
            "member_expression" | "subscript_expression" => {
                let object = ast::member_object(&callee)?;
                let object_name = ast::identifier_name(&object, self.source)?;
                let property = ast::member_property_name(&callee, self.source)?;
                let target = self.tables.object_property(&object_name, &property)?;
                let value = self.property_segment_value(target)?;
                Some((value, format!("{object_name}.{property}()")))
            }
            _ => None,
        }
    }

    /// A property map entry counts when it is itself a string-returning
    /// function/method, or an identifier naming a collected segment.
    fn property_segment_value(&self, target: Node<'t>) -> Option<String> {
        if ast::is_function_like(&target) {
            return string_return_value(target, self.source);
        }
        if target.kind() == "identifier" {
            let name = ast::node_text(&target, self.source);
            return self.tables.resolve_segment(name).map(|s| s.value.clone());
        }
        None
    }

    // --- Strategies 2 and 3: char-code transforms ---

    /// Shape check for `String.fromCharCode(...A.map(cb))` where `A`
    /// resolves to an all-numeric collected array.
    fn match_from_char_code(&self, call: Node<'t>) -> Option<CharCodeSite<'t>> {
        let callee = call.child_by_field_name("function")?;
        if ast::member_property_name(&callee, self.source)? != "fromCharCode" {
            return None;
        }
        let receiver = ast::member_object(&callee)?;
        if ast::identifier_name(&receiver, self.source)? != "String" {
            return None;
        }

        let args = ast::call_arguments(&call);
        let [spread] = args.as_slice() else {
            return None;
        };
        if spread.kind() != "spread_element" {
            return None;
        }
        let map_call = ast::strip_parens(spread.named_child(0)?);
        if map_call.kind() != "call_expression" {
            return None;
        }
        let map_callee = map_call.child_by_field_name("function")?;
        if ast::member_property_name(&map_callee, self.source)? != "map" {
            return None;
        }
        let array_node = ast::member_object(&map_callee)?;
        let array_name = ast::identifier_name(&array_node, self.source)?;
        let values = self.tables.numeric_array(&array_name)?;

        let callbacks = ast::call_arguments(&map_call);
        let [callback] = callbacks.as_slice() else {
            return None;
        };
        if !ast::is_function_value(callback) {
            return None;
        }
        Some(CharCodeSite {
            array_name,
            values,
            callback: *callback,
        })
    }

    /// Strategy 2 qualification: the callback's body must be exactly one
    /// binary expression between the parameter and a collected numeric
    /// constant, under a supported operator. Matching here only reads the
    /// shape; whether the arithmetic survives is decided separately.
    fn qualify_explicit(&self, site: &CharCodeSite<'t>) -> Option<ExplicitBinary> {
        let param = ast::single_parameter_name(&site.callback, self.source)?;
        let body = ast::strip_parens(self.returned_expression(site.callback)?);
        if body.kind() != "binary_expression" {
            return None;
        }
        let (op_node, left, right) = (
            body.child_by_field_name("operator")?,
            ast::strip_parens(body.child_by_field_name("left")?),
            ast::strip_parens(body.child_by_field_name("right")?),
        );
        let op_text = ast::node_text(&op_node, self.source);
        let mut op_chars = op_text.chars();
        let operator = op_chars.next()?;
        if op_chars.next().is_some() || !EXPLICIT_OPERATORS.contains(&operator) {
            return None;
        }

        let left_name = ast::identifier_name(&left, self.source)?;
        let right_name = ast::identifier_name(&right, self.source)?;
        let (constant_name, param_on_left) = if left_name == param {
            (right_name, true)
        } else if right_name == param {
            (left_name, false)
        } else {
            return None;
        };
        let constant = *self.tables.constants.get(&constant_name)?;
        Some(ExplicitBinary {
            operator,
            constant_name,
            constant,
            param_on_left,
        })
    }

    /// Strategy 2 evaluation: run the qualified binary element-wise. A
    /// rejected result yields no candidate, and the site stays settled.
    fn explicit_candidate(
        &self,
        site: &CharCodeSite<'t>,
        binary: &ExplicitBinary,
    ) -> Option<Candidate> {
        let value = apply_char_code(
            &site.values,
            binary.operator,
            binary.constant,
            binary.param_on_left,
        )?;
        debug!(
            target: "keyhunt::extractors",
            array = %site.array_name,
            operator = %binary.operator,
            constant = binary.constant,
            "explicit char-code candidate"
        );
        Some(Candidate {
            value,
            strategy: Strategy::CharCodeExplicit,
            provenance: Provenance::CharCode {
                array: site.array_name.clone(),
                operator: binary.operator,
                constant_name: Some(binary.constant_name.clone()),
                constant: binary.constant,
            },
        })
    }

    /// Strategy 3: enumerate (operator, constant) pairs, byte-range
    /// constants first, and accept the first pair whose output is a
    /// 64-character hex string. Per-combination failures are skipped, not
    /// fatal. The ordering is a reporting heuristic only.
    fn brute_force(&self, site: &CharCodeSite<'t>) -> Option<Candidate> {
        let mut constants: Vec<(&String, f64)> = self
            .tables
            .constants
            .iter()
            .map(|(name, value)| (name, *value))
            .collect();
        constants.sort_by(|a, b| {
            let in_range = |v: f64| (0.0..=255.0).contains(&v) && v.fract() == 0.0;
            in_range(b.1)
                .cmp(&in_range(a.1))
                .then_with(|| a.0.cmp(b.0))
        });

        for operator in BRUTE_FORCE_OPERATORS {
            for &(name, constant) in &constants {
                let Some(value) = apply_char_code(&site.values, operator, constant, true) else {
                    continue;
                };
                if classify(&value) == KeyClass::Valid {
                    debug!(
                        target: "keyhunt::extractors",
                        array = %site.array_name,
                        operator = %operator,
                        constant,
                        "brute-force char-code hit"
                    );
                    return Some(Candidate {
                        value,
                        strategy: Strategy::CharCodeBruteForce,
                        provenance: Provenance::CharCode {
                            array: site.array_name.clone(),
                            operator,
                            constant_name: Some(name.clone()),
                            constant,
                        },
                    });
                }
            }
        }
        None
    }
}

/// A matched `String.fromCharCode(...A.map(cb))` site.
struct CharCodeSite<'t> {
    array_name: String,
    values: Vec<f64>,
    callback: Node<'t>,
}

/// A qualified explicit callback body: `param op constant` or its mirror.
struct ExplicitBinary {
    operator: char,
    constant_name: String,
    constant: f64,
    param_on_left: bool,
}

/// Apply one binary operator element-wise and interpret the results as
/// character codes. Any non-finite, non-integer, or out-of-range result
/// rejects the whole transform.
pub fn apply_char_code(values: &[f64], operator: char, constant: f64, param_on_left: bool) -> Option<String> {
    let mut out = String::with_capacity(values.len());
    for &value in values {
        let (a, b) = if param_on_left {
            (value, constant)
        } else {
            (constant, value)
        };
        let result = match operator {
            '^' => f64::from(to_int32(a) ^ to_int32(b)),
            '+' => a + b,
            '-' => a - b,
            '*' => a * b,
            '/' => {
                if b == 0.0 {
                    return None;
                }
                a / b
            }
            _ => return None,
        };
        if !result.is_finite() || result.fract() != 0.0 || result < 0.0 {
            return None;
        }
        out.push(char::from_u32(result as u32)?);
    }
    Some(out)
}

/// JS ToInt32: truncate toward zero, wrap modulo 2^32, reinterpret signed.
fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let wrapped = value.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}
