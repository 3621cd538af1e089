//! Error types for binding environment variables onto a specification

/// Boxed error returned by [`Decode`](crate::Decode) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while processing a specification.
///
/// Processing stops at the first error; there is no partial success. The
/// variants cover:
/// - Required keys that resolved to nothing
/// - File read failures when using the `{KEY}_FILE` indirection
/// - Coercion failures, with the full key/field/type/value context
/// - Unknown prefixed variables found by [`check_disallowed`](crate::check_disallowed)
/// - Usage rendering failures
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// A nested specification was asked to decode a single string.
    ///
    /// Specifications are walked field by field, they have no textual form of
    /// their own. This shows up when a derived struct is used as a list
    /// element or map value.
    #[error("specification must be a struct with named fields: {type_name} cannot be decoded from a single value")]
    InvalidSpecification {
        /// Name of the offending type
        type_name: &'static str,
    },

    /// A required key resolved to no value (no variable, no file, no default).
    #[error("required key {key} missing value")]
    Missing {
        /// Primary key of the variable
        key: String,
    },

    /// An environment variable holds bytes that are not valid UTF-8.
    #[error("environment variable {name} is not valid unicode")]
    InvalidUnicode {
        /// Name of the environment variable
        name: String,
    },

    /// A file-indirection variable is set but holds an empty path.
    #[error("environment variable {name} is empty")]
    EmptyFilePath {
        /// Name of the `{KEY}_FILE` environment variable
        name: String,
    },

    /// Failed to read the file named by a `{KEY}_FILE` environment variable.
    #[error("failed to read file '{path}' named by {name}: {source}")]
    FileRead {
        /// Name of the `{KEY}_FILE` environment variable (e.g. "API_KEY_FILE")
        name: String,
        /// Path to the file that failed to be read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A file named by a `{KEY}_FILE` variable holds bytes that are not UTF-8.
    #[error("file '{path}' named by {name} is not valid UTF-8")]
    FileNotUtf8 {
        /// Name of the `{KEY}_FILE` environment variable
        name: String,
        /// Path to the offending file
        path: String,
    },

    /// Failed to convert a resolved value into the field's type.
    #[error("assigning {key} to {field}: converting '{value}' to type {type_name}: {source}")]
    Parse {
        /// Key the value was resolved for
        key: String,
        /// Rust name of the target field
        field: &'static str,
        /// Fully qualified name of the field's type
        type_name: &'static str,
        /// Raw value that failed to convert
        value: String,
        /// Underlying coercion error
        source: BoxError,
    },

    /// The environment holds a prefixed variable that no field declares.
    #[error("unknown environment variable {name}")]
    UnknownVariable {
        /// Name of the first offending variable
        name: String,
    },

    /// A caller-supplied usage template is malformed.
    #[error("invalid usage template: {message}")]
    Template {
        /// What went wrong, with the byte offset into the template
        message: String,
    },

    /// Writing usage output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serializing usage output as JSON failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EnvError {
    /// Create a missing required key error
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing { key: key.into() }
    }

    pub(crate) fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }
}
