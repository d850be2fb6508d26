use thiserror::Error;

/// Fatal failures for a key-extraction run.
///
/// Pattern mismatches are never errors: extractors communicate "this node
/// doesn't match this shape" with `Option`, and the run carries on. Only
/// problems that make the whole input unusable land here.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to parse JavaScript source: {0}")]
    Parse(String),

    #[error("grammar error: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
