// Orchestrator: runs both collectors over the whole tree once, then walks
// call expressions and function-defining nodes in encounter order, feeding
// each to the matching extractor and classifying whatever comes out.
//
// Single-threaded and fully synchronous; the only ordering guarantee is
// traversal order over the syntax tree, not the target program's runtime
// evaluation order.

use std::time::Instant;

use tracing::{debug, info};

use crate::ast;
use crate::collectors::{ArrayCollector, SegmentFunctionCollector};
use crate::error::Result;
use crate::extractors::{ArrayJoinExtractor, FunctionKeyExtractor};
use crate::report::{Candidate, ExtractionReport, FoundKey, WrongLengthCandidate};
use crate::tables::SourceTables;
use crate::validator::{KeyClass, classify};

/// Run policy for one extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionOptions {
    /// false: stop at the first valid key, short-circuiting the remaining
    /// traversal. true: collect every candidate from every strategy.
    pub exhaustive: bool,
}

/// Run the full collect-then-extract pipeline over one source text.
pub fn run_extraction(source: &str, options: &ExtractionOptions) -> Result<ExtractionReport> {
    let started = Instant::now();
    let tree = ast::parse_program(source)?;
    let root = tree.root_node();

    // Collection: both collectors are independent observers, so one walk
    // feeds them both. The tables are read-only from here on.
    let array_collector = ArrayCollector::new(source);
    let segment_collector = SegmentFunctionCollector::new(source);
    let mut tables = SourceTables::default();
    ast::visit_while(root, &mut |node| {
        array_collector.inspect(node, &mut tables);
        segment_collector.inspect(node, &mut tables);
        true
    });
    let stats = tables.stats();
    debug!(
        arrays = stats.array_count,
        segments = stats.segment_function_count,
        constants = stats.numeric_constant_count,
        "collection phase complete"
    );

    // Extraction: dispatch each node shape to its extractor, classify each
    // candidate, and honor the stop policy.
    let array_join = ArrayJoinExtractor::new(source, &tables);
    let mut function_key = FunctionKeyExtractor::new(source, &tables);
    let mut report = ExtractionReport {
        stats,
        ..ExtractionReport::default()
    };

    ast::visit_while(root, &mut |node| {
        let candidate = match node.kind() {
            "call_expression" => array_join
                .match_call(node)
                .or_else(|| function_key.match_call(node)),
            "function_declaration" | "variable_declarator" | "assignment_expression" => {
                function_key.match_definition(node)
            }
            _ => None,
        };
        match candidate {
            Some(candidate) => !record(&mut report, candidate) || options.exhaustive,
            None => true,
        }
    });

    info!(
        keys = report.keys.len(),
        non_hex = report.non_hex.len(),
        wrong_length = report.wrong_length.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "key extraction finished"
    );
    Ok(report)
}

/// Classify one candidate into its report bucket. Returns true when the
/// candidate was a valid key.
fn record(report: &mut ExtractionReport, candidate: Candidate) -> bool {
    match classify(&candidate.value) {
        KeyClass::Valid => {
            report.keys.push(FoundKey {
                key: candidate.value,
                strategy: candidate.strategy,
                provenance: candidate.provenance,
            });
            true
        }
        KeyClass::NonHex => {
            report.non_hex.push(candidate);
            false
        }
        KeyClass::WrongLength => {
            let length = candidate.value.chars().count();
            report.wrong_length.push(WrongLengthCandidate {
                value: candidate.value,
                length,
                strategy: candidate.strategy,
                provenance: candidate.provenance,
            });
            false
        }
    }
}
