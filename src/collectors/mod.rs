// Collection phase: independent observers that walk the whole tree once
// and populate the symbol tables the extractors query.

pub mod arrays;
pub mod segments;

pub use arrays::ArrayCollector;
pub use segments::SegmentFunctionCollector;
