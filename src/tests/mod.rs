// Keyhunt test infrastructure.
//
// Fixture sources are inline JavaScript snippets in the shapes the upstream
// simplification passes hand to this stage. Shared helpers parse them and
// build the collection tables the extractors run against.

pub mod array_join_tests;
pub mod collector_tests;

use tree_sitter::Node;

use crate::ast;
use crate::collectors::{ArrayCollector, SegmentFunctionCollector};
use crate::tables::SourceTables;

/// Run both collectors over a parsed program, the way the engine does.
pub fn build_tables<'t>(root: Node<'t>, source: &str) -> SourceTables<'t> {
    let arrays = ArrayCollector::new(source);
    let segments = SegmentFunctionCollector::new(source);
    let mut tables = SourceTables::default();
    ast::visit_while(root, &mut |node| {
        arrays.inspect(node, &mut tables);
        segments.inspect(node, &mut tables);
        true
    });
    tables
}

/// A syntactically valid 64-character lowercase hex key for fixtures.
pub fn sample_key() -> String {
    "0123456789abcdef".repeat(4)
}
