use thiserror::Error;

/// Errors raised while converting a single tree. All of them abort that
/// conversion; batch callers isolate them per input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Structural mismatch: expected {expected}, got {found}")]
    StructuralMismatch { expected: String, found: String },

    #[error("Unsupported class name form: {name}")]
    UnsupportedNameForm { name: String },

    #[error("Unknown stub shape: {0}")]
    UnknownStubShape(String),

    #[error("Unsupported message receive count: {0}")]
    UnsupportedCallCount(String),

    #[error("Failed to find receiver of stub on call to '{method}'")]
    ReceiverNotFound { method: String },

    #[error("Tree nesting exceeds maximum depth of {max_depth}")]
    NestingTooDeep { max_depth: usize },

    #[error("Notation error: {0}")]
    Notation(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl ConvertError {
    /// Create a structural mismatch error for a node of the wrong kind
    pub fn mismatch(expected: &str, found: &str) -> Self {
        Self::StructuralMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn notation(message: impl Into<String>) -> Self {
        Self::Notation(message.into())
    }
}

/// Result type for tree transformations
pub type TransformResult<T> = std::result::Result<T, ConvertError>;
