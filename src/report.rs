// Report data model: candidates, strategies, provenance, and the
// structured result an embedding pipeline consumes.

use std::fmt;

use serde::Serialize;

use crate::tables::LiteralValue;

/// Which construction pattern produced a candidate string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    ArrayJoin,
    Concatenation,
    CharCodeExplicit,
    CharCodeBruteForce,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::ArrayJoin => "array-join",
            Strategy::Concatenation => "concatenation",
            Strategy::CharCodeExplicit => "char-code",
            Strategy::CharCodeBruteForce => "char-code-brute-force",
        };
        f.write_str(name)
    }
}

/// The data sources and operator a candidate was derived from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    ArrayJoin {
        index_array: String,
        string_array: String,
        /// Snapshots of the arrays at collection time, for the report.
        index_values: Vec<LiteralValue>,
        string_values: Vec<LiteralValue>,
    },
    Concatenation {
        /// The assembling function the chain was found in.
        assembler: String,
        /// Ordered components: segment calls and quoted literals.
        components: Vec<String>,
    },
    CharCode {
        array: String,
        operator: char,
        constant_name: Option<String>,
        constant: f64,
    },
}

impl Provenance {
    fn describe(&self) -> String {
        match self {
            Provenance::ArrayJoin {
                index_array,
                string_array,
                ..
            } => format!("from arrays '{string_array}' and '{index_array}'"),
            Provenance::Concatenation {
                assembler,
                components,
            } => format!("via {assembler}: {}", components.join(" + ")),
            Provenance::CharCode {
                array,
                operator,
                constant_name,
                constant,
            } => match constant_name {
                Some(name) => format!("from '{array}' with {name} ({constant}) under '{operator}'"),
                None => format!("from '{array}' with {constant} under '{operator}'"),
            },
        }
    }
}

/// A string statically reconstructed by a strategy, pending classification.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub value: String,
    pub strategy: Strategy,
    pub provenance: Provenance,
}

/// A candidate that classified as a valid key.
#[derive(Debug, Clone, Serialize)]
pub struct FoundKey {
    pub key: String,
    pub strategy: Strategy,
    pub provenance: Provenance,
}

/// A candidate of the wrong length, kept for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct WrongLengthCandidate {
    pub value: String,
    pub length: usize,
    pub strategy: Strategy,
    pub provenance: Provenance,
}

/// Counts of what the collection phase harvested.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CollectionStats {
    pub array_count: usize,
    pub segment_function_count: usize,
    pub numeric_constant_count: usize,
}

/// The structured result of one extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    /// Valid keys in encounter order.
    pub keys: Vec<FoundKey>,
    /// 64-character candidates that failed the hex charset check.
    pub non_hex: Vec<Candidate>,
    /// Candidates that were not 64 characters long.
    pub wrong_length: Vec<WrongLengthCandidate>,
    pub stats: CollectionStats,
}

impl ExtractionReport {
    pub fn found_key(&self) -> Option<&FoundKey> {
        self.keys.first()
    }

    /// Human-readable rendering of the run, diagnostics included.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if self.keys.is_empty() {
            out.push_str("--- AES Key Not Found ---\n");
        } else {
            out.push_str(&format!("--- Found {} AES Key(s) ---\n", self.keys.len()));
            for (idx, found) in self.keys.iter().enumerate() {
                out.push_str(&format!(
                    "\nKey {} ({}): {}\n  {}\n",
                    idx + 1,
                    found.strategy,
                    found.key,
                    found.provenance.describe()
                ));
            }
        }

        if !self.non_hex.is_empty() {
            out.push_str(&format!(
                "\n{} candidate(s) were 64 characters but not valid hex:\n",
                self.non_hex.len()
            ));
            for cand in &self.non_hex {
                out.push_str(&format!(
                    "  - [{}] \"{}\" ({})\n",
                    cand.strategy,
                    cand.value,
                    cand.provenance.describe()
                ));
            }
        }

        if !self.wrong_length.is_empty() {
            out.push_str(&format!(
                "\n{} candidate(s) had the wrong length:\n",
                self.wrong_length.len()
            ));
            for cand in &self.wrong_length {
                out.push_str(&format!(
                    "  - [{}] \"{}\" (length {}) ({})\n",
                    cand.strategy,
                    cand.value,
                    cand.length,
                    cand.provenance.describe()
                ));
            }
        }

        out.push_str(&format!(
            "\nCollection: {} array(s), {} segment function(s), {} numeric constant(s)\n",
            self.stats.array_count,
            self.stats.segment_function_count,
            self.stats.numeric_constant_count
        ));

        out
    }
}
