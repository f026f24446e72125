//! Error types for contract loading, building and validation.

use std::path::PathBuf;

/// Errors raised while turning a contract document into contracts.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// No converter accepts the file. Callers usually skip the file.
    #[error("{} is not a supported contract document", .path.display())]
    DocumentRejected { path: PathBuf },

    #[error("failed to read contract document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document failed to parse or threw while being evaluated.
    #[error("failed to evaluate contract document {}: {message}", .path.display())]
    ScriptEvaluation { path: PathBuf, message: String },

    /// A builder was given conflicting or malformed input.
    #[error("invalid contract definition: {0}")]
    Definition(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "contract name '{name}' is defined in both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl ContractError {
    pub(crate) fn definition(message: impl Into<String>) -> Self {
        ContractError::Definition(message.into())
    }
}

/// A violated contract invariant.
///
/// The messages are stable; tooling matches on the fragments
/// (`method`, `URL`, `status`, `header`, `cookie`, `body matcher`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("URL is missing for an HTTP contract")]
    MissingUrl,

    #[error("method is missing for an HTTP contract")]
    MissingMethod,

    #[error("status is missing for an HTTP contract")]
    MissingStatus,

    #[error("{section} header is missing its name or value (name: '{name}')")]
    IncompleteHeader { section: &'static str, name: String },

    #[error("{section} cookie is missing its name or value (name: '{name}')")]
    IncompleteCookie { section: &'static str, name: String },

    #[error("{section} body matcher is missing its path or its matcher (path: '{path}')")]
    IncompleteBodyMatcher { section: &'static str, path: String },
}
