//! Field walker: flattens a specification into an ordered list of variables
//!
//! `#[derive(Specification)]` emits one [`visit`] call per non-ignored field, in
//! declaration order. Each call derives the field's key and then either records
//! a leaf [`Variable`] or, for nested specifications, walks the nested struct
//! with the key as its new prefix. A nested field contributes only its
//! children; it has no variable of its own.

use std::sync::LazyLock;

use regex::Regex;

use crate::decode::{short_type_name, Decode};
use crate::error::EnvError;
use crate::options::Options;
use crate::variable::{FieldMeta, Target, Variable};

/// A struct whose fields are bound to environment variables.
///
/// Implemented by `#[derive(Specification)]`; implementing it by hand is possible
/// but rarely useful.
pub trait Specification {
    /// Append one [`Variable`] per leaf field, in declaration order, recursing
    /// into nested specifications.
    fn gather<'a>(
        &'a mut self,
        opts: &Options,
        vars: &mut Vec<Variable<'a>>,
    ) -> Result<(), EnvError>;

    /// Options used by [`from_env`](Specification::from_env).
    ///
    /// Carries the struct-level `#[env(prefix = "...")]` when one is given.
    fn options() -> Options
    where
        Self: Sized,
    {
        Options::default()
    }

    /// Build `Self::default()` and populate it from the environment.
    ///
    /// # Errors
    ///
    /// - Required keys resolve to no value
    /// - Values cannot be converted into their field types
    /// - File-indirection variables name unreadable files
    fn from_env() -> anyhow::Result<Self>
    where
        Self: Default + Sized,
    {
        Self::from_env_with(&Self::options())
    }

    /// Same as [`from_env`](Specification::from_env) with explicit options.
    fn from_env_with(opts: &Options) -> anyhow::Result<Self>
    where
        Self: Default + Sized,
    {
        let mut spec = Self::default();
        crate::process(&mut spec, opts)?;
        Ok(spec)
    }
}

/// How the walker treats one field, see [`Decode::slot`].
pub enum Slot<'a> {
    /// Bound to a single key and decoded from its value.
    Leaf(&'a mut dyn Decode),
    /// Walked field by field under the field's key.
    Nested(&'a mut dyn Specification),
}

/// Collect the variables of `spec`.
///
/// The returned variables borrow the fields of `spec` they will write into.
pub fn gather<'a, S: Specification + ?Sized>(
    spec: &'a mut S,
    opts: &Options,
) -> Result<Vec<Variable<'a>>, EnvError> {
    let mut vars = Vec::new();
    spec.gather(opts, &mut vars)?;
    Ok(vars)
}

/// Record a field decoded through its own [`Decode`] impl.
#[doc(hidden)]
pub fn visit<'a, T: Decode + 'a>(
    target: &'a mut T,
    meta: FieldMeta,
    opts: &Options,
    vars: &mut Vec<Variable<'a>>,
) -> Result<(), EnvError> {
    let (key, alt_key) = resolve_key(opts.prefix(), &meta);

    match target.slot() {
        Slot::Nested(spec) => {
            let inner = if meta.flatten {
                opts.clone()
            } else {
                opts.nested(key)
            };
            tracing::trace!(
                field = meta.name,
                prefix = inner.prefix(),
                "walking nested specification"
            );
            spec.gather(&inner, vars)
        }
        Slot::Leaf(leaf) => {
            vars.push(Variable::new(
                key,
                alt_key,
                meta,
                std::any::type_name::<T>(),
                T::description(),
                opts.clone(),
                Target::Field(leaf),
            ));
            Ok(())
        }
    }
}

/// Record a field decoded through an adapter (`deserializer`, `from_str`, `from_bytes`).
///
/// `T` is the field's declared type; adapters are always leaves.
#[doc(hidden)]
pub fn visit_with<'a, T: ?Sized>(
    adapter: Box<dyn Decode + 'a>,
    meta: FieldMeta,
    opts: &Options,
    vars: &mut Vec<Variable<'a>>,
) -> Result<(), EnvError> {
    let (key, alt_key) = resolve_key(opts.prefix(), &meta);
    vars.push(Variable::new(
        key,
        alt_key,
        meta,
        std::any::type_name::<T>(),
        short_type_name::<T>(),
        opts.clone(),
        Target::Adapter(adapter),
    ));
    Ok(())
}

/// Derive `(key, alt_key)` for a field.
///
/// An explicit name is upper-cased and also returned, unprefixed, as the
/// alternate key. Otherwise the identifier is used as is, or split into words
/// when `split_words` is set. The prefix is joined with `_` and the key upper-cased.
pub(crate) fn resolve_key(prefix: &str, meta: &FieldMeta) -> (String, Option<String>) {
    let explicit = meta
        .key
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_uppercase);

    let base = match &explicit {
        Some(name) => name.clone(),
        None if meta.split_words => split_words(meta.name).join("_"),
        None => meta.name.to_string(),
    };

    let key = if prefix.is_empty() {
        base
    } else {
        format!("{prefix}_{base}")
    };

    (key.to_uppercase(), explicit)
}

static WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("([^A-Z]+|[A-Z]+[^A-Z]+|[A-Z]+)").expect("word pattern is valid")
});

static ACRONYM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("([A-Z]+)([A-Z][^A-Z]+)").expect("acronym pattern is valid")
});

/// Split an identifier at capitalization boundaries.
///
/// A run of capitals followed by a lower-case word is split before the last
/// capital: `APIKey` → `["API", "Key"]`, `DBHost` → `["DB", "Host"]`.
///
/// ```rust
/// assert_eq!(envbind::split_words("MaxConnections"), ["Max", "Connections"]);
/// assert_eq!(envbind::split_words("APIKey"), ["API", "Key"]);
/// ```
pub fn split_words(ident: &str) -> Vec<String> {
    WORDS
        .find_iter(ident)
        .flat_map(|word| match ACRONYM.captures(word.as_str()) {
            Some(caps) => vec![caps[1].to_string(), caps[2].to_string()],
            None => vec![word.as_str().to_string()],
        })
        .collect()
}
