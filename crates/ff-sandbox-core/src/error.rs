//! Unified error types for the ff-sandbox template engine.

use thiserror::Error;

/// All errors that can occur while looking up, compiling, binding or rendering a template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    // --- Registry ---

    /// The requested operation key has no template (e.g. `nonexistent`).
    #[error("unknown operation: {0} (supported: pools, mint, burn, transfer, broadcast, private)")]
    UnknownOperation(String),

    // --- Compiler ---

    /// The template source is malformed: unterminated or malformed directive, reference to a
    /// field outside the parameter contract, or unbalanced conditional blocks.
    ///
    /// The corpus is static, so this only ever surfaces at build/test time or at startup.
    #[error("template syntax error at line {line}: {message}")]
    TemplateSyntax { line: usize, message: String },

    // --- Binder ---

    /// A required field was not supplied (or was null/empty) and has no default.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// A supplied value has the wrong shape for its field (e.g. a non-numeric amount)
    /// or falls outside the field's allowed set.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },

    // --- Renderer ---

    /// An interpolation referenced a field the binding does not hold a value for.
    /// Indicates a mismatch between a template and its parameter contract.
    #[error("template references unbound field: {0}")]
    UnboundInterpolation(String),
}

impl SandboxError {
    /// Whether the error was caused by caller input rather than a defect in the corpus.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownOperation(_) | Self::MissingRequiredField(_) | Self::InvalidFieldValue { .. }
        )
    }
}

/// Alias for `Result<T, SandboxError>`.
pub type Result<T> = std::result::Result<T, SandboxError>;
