use std::io;

/// Fatal decode/encode error types.
///
/// Anything repairable never surfaces here; it is clamped and reported
/// through the `ValidationReport` instead.
#[derive(Debug)]
pub enum FormatError {
    /// IO error occurred
    Io(io::Error),

    /// A section declared more data than the file contains
    Truncated {
        section: &'static str,
        expected: u64,
        actual: u64,
    },

    /// A header count exceeds the known tool limits
    InvalidCount {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// NaN or infinite coordinate in a record
    NonFinite { record: &'static str, index: usize },

    /// Texture buffer does not match the fixed row layout
    TextureLayout { message: String },

    /// Deform evaluator returned the wrong number of vertices during baking
    VertexCountMismatch {
        animation: String,
        expected: usize,
        actual: usize,
    },

    /// Low-level binary codec error
    Binary(binrw::Error),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Io(e) => write!(f, "IO error: {}", e),
            FormatError::Truncated {
                section,
                expected,
                actual,
            } => write!(
                f,
                "Truncated {} section: expected {} bytes, got {}",
                section, expected, actual
            ),
            FormatError::InvalidCount { field, value, max } => {
                write!(f, "Invalid {}: {} exceeds maximum {}", field, value, max)
            }
            FormatError::NonFinite { record, index } => {
                write!(f, "Non-finite coordinates in {} #{}", record, index)
            }
            FormatError::TextureLayout { message } => {
                write!(f, "Texture layout mismatch: {}", message)
            }
            FormatError::VertexCountMismatch {
                animation,
                expected,
                actual,
            } => write!(
                f,
                "Animation '{}' evaluated to {} vertices, base mesh has {}",
                animation, actual, expected
            ),
            FormatError::Binary(e) => write!(f, "Binary codec error: {}", e),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Io(e) => Some(e),
            FormatError::Binary(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        FormatError::Io(err)
    }
}

impl From<binrw::Error> for FormatError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(e) => FormatError::Io(e),
            other => FormatError::Binary(other),
        }
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, FormatError>;
