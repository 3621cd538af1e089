//! Populating a specification and validating the environment against it

use std::collections::HashSet;
use std::env;

use crate::error::EnvError;
use crate::options::Options;
use crate::walk::{gather, Specification};

/// Populate `spec` from the environment.
///
/// Fields are processed in declaration order; the first failure aborts the call
/// and leaves earlier fields already written. A field with no value, no file
/// and no default keeps its current value unless it is required.
///
/// ```rust
/// use envbind::{process, Options, Specification};
///
/// #[derive(Default, Specification)]
/// struct Config {
///     #[env(default = 8080)]
///     port: u16,
///     debug: bool,
/// }
///
/// std::env::set_var("DOCTEST_PROCESS_DEBUG", "true");
///
/// let mut config = Config::default();
/// process(&mut config, &Options::new().with_prefix("doctest_process")).unwrap();
///
/// assert_eq!(config.port, 8080);
/// assert!(config.debug);
/// ```
///
/// # Errors
///
/// - [`EnvError::Missing`] for a required key with no value
/// - [`EnvError::Parse`] when a value does not convert into the field's type
/// - [`EnvError::FileRead`] / [`EnvError::EmptyFilePath`] for broken file indirection
pub fn process<S: Specification + ?Sized>(spec: &mut S, opts: &Options) -> Result<(), EnvError> {
    let vars = gather(spec, opts)?;
    tracing::debug!(variables = vars.len(), prefix = opts.prefix(), "processing specification");

    for mut var in vars {
        let Some(resolved) = var.value()? else {
            if var.is_required() {
                tracing::debug!(key = var.key(), "required key has no value");
                return Err(EnvError::missing(var.key()));
            }
            tracing::trace!(key = var.key(), "no value, keeping current");
            continue;
        };

        tracing::debug!(key = var.key(), source = resolved.source.as_str(), "resolved variable");
        if let Err(source) = var.decode(&resolved.value) {
            return Err(EnvError::Parse {
                key: var.key().to_string(),
                field: var.field_name(),
                type_name: var.type_name(),
                value: resolved.value,
                source,
            });
        }
    }

    Ok(())
}

/// Same as [`process`], panicking with the error message on failure.
///
/// # Panics
///
/// When [`process`] returns an error.
#[track_caller]
pub fn must_process<S: Specification + ?Sized>(spec: &mut S, opts: &Options) {
    if let Err(err) = process(spec, opts) {
        panic!("{err}");
    }
}

/// Fail if the environment holds a `PREFIX_`-prefixed variable that `spec` does not declare.
///
/// Only the key of each field counts as declared. With
/// [`Options::with_file_variables_allowed`] the `{KEY}{SUFFIX}` variables of
/// fields that load from files are accepted too. With an empty prefix every
/// variable in the environment is checked.
///
/// # Errors
///
/// [`EnvError::UnknownVariable`] naming the first undeclared variable found.
pub fn check_disallowed<S: Specification + ?Sized>(
    spec: &mut S,
    opts: &Options,
) -> Result<(), EnvError> {
    let vars = gather(spec, opts)?;

    let mut declared = HashSet::new();
    for var in &vars {
        declared.insert(var.key().to_string());
        if opts.allow_file_variables() {
            declared.extend(var.file_variable_names());
        }
    }

    let prefix = if opts.prefix().is_empty() {
        String::new()
    } else {
        format!("{}_", opts.prefix())
    };

    for (name, _) in env::vars_os() {
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && !declared.contains(&*name) {
            tracing::debug!(variable = %name, "undeclared variable in environment");
            return Err(EnvError::UnknownVariable {
                name: name.into_owned(),
            });
        }
    }

    Ok(())
}
