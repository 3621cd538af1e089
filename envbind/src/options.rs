//! Process-wide options for a single walk

/// Suffix appended to a key to name its file-indirection variable.
pub const DEFAULT_FILE_SUFFIX: &str = "_FILE";

/// Options that apply to every field of one `process`/`check_disallowed`/usage call.
///
/// Built with consuming builder methods:
///
/// ```rust
/// use envbind::Options;
///
/// let opts = Options::new()
///     .with_prefix("app")
///     .with_default_file_suffix("_PATH")
///     .without_trim_spaces();
///
/// assert_eq!(opts.prefix(), "APP");
/// assert_eq!(opts.file_suffix(), "_PATH");
/// assert!(opts.load_from_file());
/// assert!(!opts.trim_spaces());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    prefix: String,
    load_from_file: bool,
    file_suffix: String,
    trim_spaces: bool,
    allow_file_variables: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            load_from_file: true,
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            trim_spaces: true,
            allow_file_variables: false,
        }
    }
}

impl Options {
    /// Options with no prefix, file loading enabled, `_FILE` suffix and trimming enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every derived key with `PREFIX_`. The prefix is upper-cased.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().to_uppercase();
        self
    }

    /// Disable loading values from files named by `{KEY}_FILE` variables.
    ///
    /// Fields tagged with `#[env(file)]` or a custom suffix still load from files.
    pub fn without_default_loading_from_files(mut self) -> Self {
        self.load_from_file = false;
        self
    }

    /// Replace the default `_FILE` suffix. A blank suffix restores the default.
    pub fn with_default_file_suffix(mut self, suffix: impl AsRef<str>) -> Self {
        let suffix = suffix.as_ref().trim();
        self.file_suffix = if suffix.is_empty() {
            DEFAULT_FILE_SUFFIX.to_string()
        } else {
            suffix.to_string()
        };
        self
    }

    /// Keep leading and trailing whitespace of values read from the environment or files.
    pub fn without_trim_spaces(mut self) -> Self {
        self.trim_spaces = false;
        self
    }

    /// Let [`check_disallowed`](crate::check_disallowed) accept the `{KEY}{SUFFIX}`
    /// variables of fields that load from files. Only declared keys are accepted otherwise.
    pub fn with_file_variables_allowed(mut self) -> Self {
        self.allow_file_variables = true;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn load_from_file(&self) -> bool {
        self.load_from_file
    }

    pub fn file_suffix(&self) -> &str {
        &self.file_suffix
    }

    pub fn trim_spaces(&self) -> bool {
        self.trim_spaces
    }

    pub fn allow_file_variables(&self) -> bool {
        self.allow_file_variables
    }

    /// Options for a nested walk: same settings, prefix replaced by the parent key.
    pub(crate) fn nested(&self, prefix: String) -> Self {
        Self {
            prefix,
            ..self.clone()
        }
    }
}
