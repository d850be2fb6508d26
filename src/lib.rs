// Keyhunt - Static AES Key Recovery Library
//!
//! Keyhunt is the terminal stage of a JavaScript deobfuscation pipeline: it
//! statically re-derives the 64-character hexadecimal key that obfuscated
//! code assembles at runtime, without ever executing the target program.
//!
//! The pipeline is collect-then-analyze: two collectors walk the whole tree
//! once and build symbol tables of candidate data sources (literal arrays,
//! string-returning segment functions, numeric constants, identifier
//! aliases, object-property maps), then the extractors pattern-match call
//! expressions and function definitions against four construction
//! strategies, querying those tables instead of the program's runtime state.

pub mod ast;
pub mod collectors;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod report;
pub mod tables;
pub mod validator;

#[cfg(test)]
pub mod tests;

// Re-export common types
pub use engine::{ExtractionOptions, run_extraction};
pub use error::{ExtractError, Result};
pub use report::{Candidate, CollectionStats, ExtractionReport, FoundKey, Provenance, Strategy};
pub use validator::{KeyClass, classify};
