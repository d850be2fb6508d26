// Extraction phase: pattern matchers that statically re-derive the string
// an obfuscated expression would produce, querying the collected tables.

pub mod array_join;
pub mod function_key;

pub use array_join::ArrayJoinExtractor;
pub use function_key::FunctionKeyExtractor;
