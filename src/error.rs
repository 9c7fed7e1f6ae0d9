use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can go wrong while loading or querying an [`IFile`](crate::IFile).
///
/// Load-time variants (`MissingField`, `Shape`, `Metadata`, `Io`, `Json`) abort
/// construction. `Timestamp` is recoverable and only surfaces through the log
/// during loading. `InvalidPair` and `KeyNotFound` are raised at call time.
#[derive(Debug, Error)]
pub enum IFileError {
    /// A required raw-record path is absent.
    #[error("missing field '{path}'")]
    MissingField { path: String },

    /// A value exists but has the wrong dimensionality for the accessor.
    #[error("shape mismatch at '{path}': expected {expected}, found {found}")]
    Shape {
        path: String,
        expected: String,
        found: String,
    },

    /// A channel or parameter's values cannot be resolved.
    #[error("cannot build metadata for '{name}': {message}")]
    Metadata { name: String, message: String },

    /// The header timestamp is not a valid calendar date/time.
    #[error("invalid header timestamp '{raw}': {message}")]
    Timestamp { raw: String, message: String },

    /// A correction pair names a channel that is not on the crank-angle axis.
    #[error("invalid correction pair {measurement} -> {reference}: {message}")]
    InvalidPair {
        measurement: String,
        reference: String,
        message: String,
    },

    /// Unknown section, channel or parameter requested by a consumer.
    #[error("{kind} '{key}' not found")]
    KeyNotFound { kind: &'static str, key: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IFileError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    pub fn shape(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Shape {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn metadata(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Metadata {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_pair(
        measurement: impl Into<String>,
        reference: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPair {
            measurement: measurement.into(),
            reference: reference.into(),
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::KeyNotFound {
            kind,
            key: key.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IFileError>;
