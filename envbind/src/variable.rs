//! Bindable variables and value resolution
//!
//! A [`Variable`] pairs a field's descriptor with its resolved key(s) and the
//! storage it writes into. [`Variable::value`] resolves the string to decode:
//!
//! 1. For the primary key, then the alternate key:
//!    - the environment variable itself
//!    - if unset and file loading applies, the file named by `{NAME}{SUFFIX}`
//! 2. The field's declared default
//!
//! Values from the environment or a file are trimmed unless trimming is disabled.
//! Defaults are used verbatim.

use std::env::{self, VarError};
use std::fmt;
use std::fs;

use crate::decode::Decode;
use crate::error::{BoxError, EnvError};
use crate::options::Options;

/// Per-field file-indirection directive (`#[env(file ...)]`).
///
/// File contents must be UTF-8, including for `Vec<u8>` and `from_bytes`
/// fields; other files fail with [`EnvError::FileNotUtf8`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLoading {
    /// No tag: follow [`Options::load_from_file`].
    Inherit,
    /// `#[env(file)]` / `#[env(file = true)]`
    Enabled,
    /// `#[env(file = false)]`
    Disabled,
    /// `#[env(file = "_SUFFIX")]`: enabled with a custom suffix.
    Suffix(&'static str),
}

/// Static descriptor of one struct field, emitted by the derive macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Rust identifier of the field
    pub name: &'static str,
    /// Explicit key override
    pub key: Option<&'static str>,
    /// Derive the key from the identifier's capitalization
    pub split_words: bool,
    /// Fail when no value resolves
    pub required: bool,
    /// Fallback value, decoded like any other value
    pub default: Option<&'static str>,
    pub file: FileLoading,
    /// Shown in usage output
    pub description: Option<&'static str>,
    /// Walk a nested specification under the parent prefix instead of the field key
    pub flatten: bool,
}

impl FieldMeta {
    /// Descriptor with no tags.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            key: None,
            split_words: false,
            required: false,
            default: None,
            file: FileLoading::Inherit,
            description: None,
            flatten: false,
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Environment,
    File,
    Default,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::File => "file",
            Self::Default => "default",
        }
    }
}

/// A resolved value and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: Source,
}

pub(crate) enum Target<'a> {
    Field(&'a mut dyn Decode),
    Adapter(Box<dyn Decode + 'a>),
}

/// One discovered configuration slot: its keys, descriptor and target storage.
pub struct Variable<'a> {
    key: String,
    alt_key: Option<String>,
    meta: FieldMeta,
    type_name: &'static str,
    type_description: String,
    opts: Options,
    target: Target<'a>,
}

impl<'a> Variable<'a> {
    pub(crate) fn new(
        key: String,
        alt_key: Option<String>,
        meta: FieldMeta,
        type_name: &'static str,
        type_description: String,
        opts: Options,
        target: Target<'a>,
    ) -> Self {
        Self {
            key,
            alt_key,
            meta,
            type_name,
            type_description,
            opts,
            target,
        }
    }

    /// Canonical, prefixed, upper-case key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Unprefixed explicit name, tried after [`key`](Variable::key).
    pub fn alt_key(&self) -> Option<&str> {
        self.alt_key.as_deref()
    }

    pub fn field_name(&self) -> &'static str {
        self.meta.name
    }

    /// Fully qualified Rust type name of the field.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Human-readable type description for usage output.
    pub fn type_description(&self) -> &str {
        &self.type_description
    }

    pub fn is_required(&self) -> bool {
        self.meta.required
    }

    pub fn default_value(&self) -> Option<&'static str> {
        self.meta.default
    }

    pub fn description(&self) -> Option<&'static str> {
        self.meta.description
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Names the resolver looks up, in order.
    fn lookup_names(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.key.as_str()).chain(
            self.alt_key
                .as_deref()
                .filter(|alt| *alt != self.key),
        )
    }

    /// File-indirection variable names consulted for this field, if file loading applies.
    pub fn file_variable_names(&self) -> Vec<String> {
        match self.file_suffix() {
            Some(suffix) => self
                .lookup_names()
                .map(|name| format!("{name}{suffix}").to_uppercase())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Resolve the string value for this field.
    ///
    /// Returns `Ok(None)` when neither the environment, a file nor a default provides one.
    pub fn value(&self) -> Result<Option<Resolved>, EnvError> {
        for name in self.lookup_names() {
            if let Some(mut resolved) = self.try_env(name)? {
                if self.opts.trim_spaces() {
                    resolved.value = resolved.value.trim().to_string();
                }
                return Ok(Some(resolved));
            }
        }

        Ok(self.meta.default.map(|value| Resolved {
            value: value.to_string(),
            source: Source::Default,
        }))
    }

    fn try_env(&self, name: &str) -> Result<Option<Resolved>, EnvError> {
        if let Some(value) = lookup_env(name)? {
            return Ok(Some(Resolved {
                value,
                source: Source::Environment,
            }));
        }

        self.load_from_file(name)
    }

    fn load_from_file(&self, name: &str) -> Result<Option<Resolved>, EnvError> {
        let Some(suffix) = self.file_suffix() else {
            return Ok(None);
        };

        let file_var = format!("{name}{suffix}").to_uppercase();
        let Some(path) = lookup_env(&file_var)? else {
            return Ok(None);
        };

        let path = path.trim();
        if path.is_empty() {
            return Err(EnvError::EmptyFilePath { name: file_var });
        }

        tracing::trace!(key = name, variable = %file_var, "reading value from file");
        let bytes = fs::read(path).map_err(|source| EnvError::FileRead {
            name: file_var.clone(),
            path: path.to_string(),
            source,
        })?;
        let value = String::from_utf8(bytes).map_err(|_| EnvError::FileNotUtf8 {
            name: file_var,
            path: path.to_string(),
        })?;

        Ok(Some(Resolved {
            value,
            source: Source::File,
        }))
    }

    /// Suffix of the file-indirection variable, or `None` when file loading is off.
    ///
    /// An explicit tag overrides the options; a blank custom suffix means the default one.
    fn file_suffix(&self) -> Option<&str> {
        let tagged = match self.meta.file {
            FileLoading::Inherit if self.opts.load_from_file() => "",
            FileLoading::Inherit | FileLoading::Disabled => return None,
            FileLoading::Enabled => "",
            FileLoading::Suffix(suffix) => suffix.trim(),
        };

        Some(if tagged.is_empty() {
            self.opts.file_suffix()
        } else {
            tagged
        })
    }

    /// Write `value` into the field.
    pub(crate) fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        match &mut self.target {
            Target::Field(field) => field.decode(value),
            Target::Adapter(adapter) => adapter.decode(value),
        }
    }
}

impl fmt::Debug for Variable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("key", &self.key)
            .field("alt_key", &self.alt_key)
            .field("meta", &self.meta)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

fn lookup_env(name: &str) -> Result<Option<String>, EnvError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(EnvError::InvalidUnicode {
            name: name.to_string(),
        }),
    }
}
