//! Bind environment variables onto configuration structs
//!
//! `envbind` walks a struct deriving [`Specification`], derives an environment
//! variable key for every field, and writes the converted value into it:
//!
//! - **Keys**: `PREFIX_FIELD`, upper-cased; `#[env(split_words)]` turns `MaxConns`
//!   into `MAX_CONNS`, `#[env(name = "...")]` overrides the key entirely.
//! - **Nesting**: fields whose type also derives [`Specification`] are walked with
//!   the field key as their prefix (`APP_DB_HOST`).
//! - **File indirection**: when `KEY` is unset, the file named by `KEY_FILE` is read
//!   instead (Docker/Kubernetes secrets).
//! - **Defaults and required keys**: `#[env(default = ...)]`, `#[env(required)]`.
//! - **Coercion**: integers with base prefixes, floats, booleans, durations
//!   (`1h30m`), lists (`a,b,c`), maps (`k:v,k2:v2`) and anything implementing
//!   [`Decode`], `FromStr` or `TryFrom<Vec<u8>>`.
//! - **Validation and docs**: [`check_disallowed`] rejects unknown prefixed
//!   variables; [`usage`] renders a table of every variable.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use envbind::Specification;
//!
//! #[derive(Debug, Default, Specification)]
//! struct Database {
//!     #[env(default = "localhost")]
//!     host: String,
//!     #[env(default = 5432)]
//!     port: u16,
//! }
//!
//! #[derive(Debug, Default, Specification)]
//! #[env(prefix = "myapp")]
//! struct Config {
//!     /// Secret used to sign sessions
//!     #[env(required, split_words)]
//!     signing_key: String,
//!
//!     #[env(default = "30s")]
//!     timeout: Duration,
//!
//!     db: Database,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! std::env::set_var("MYAPP_SIGNING_KEY", "s3cr3t");
//! std::env::set_var("MYAPP_DB_HOST", "db.internal");
//!
//! let config = Config::from_env()?;
//! assert_eq!(config.signing_key, "s3cr3t");
//! assert_eq!(config.timeout, Duration::from_secs(30));
//! assert_eq!(config.db.host, "db.internal");
//! assert_eq!(config.db.port, 5432);
//! # Ok(())
//! # }
//! ```
//!
//! # Resolution order
//!
//! For each field:
//!
//! 1. `PREFIX_KEY`, then `PREFIX_KEY_FILE` (a path whose contents become the value)
//! 2. With `#[env(name = "KEY")]`, the unprefixed `KEY` and `KEY_FILE`
//! 3. The `default`, used verbatim
//!
//! Values from the environment and files are trimmed of surrounding whitespace
//! unless [`Options::without_trim_spaces`] is set.
//!
//! # Field attributes
//!
//! | Attribute | Effect |
//! |-----------|--------|
//! | `name = "KEY"` | Explicit key (still prefixed; the bare key is tried second) |
//! | `split_words` | `APIKey` → `API_KEY` |
//! | `default = value` | Fallback when no variable or file provides a value |
//! | `required` | Fail with [`EnvError::Missing`] when nothing resolves |
//! | `file`, `file = false`, `file = "_SUFFIX"` | Force, disable or re-suffix file loading |
//! | `desc = "..."` | Usage description (doc comments are used otherwise) |
//! | `flatten` | Walk a nested struct under the parent prefix |
//! | `ignored` | Skip the field |
//! | `deserializer = "path"` | Convert with `fn(&str) -> Result<T, E>` |
//! | `from_str` / `from_bytes` | Convert with `FromStr` / `TryFrom<Vec<u8>>` |

pub mod adapt;
mod decode;
mod duration;
mod error;
mod options;
mod process;
mod usage;
mod variable;
#[doc(hidden)]
pub mod walk;

pub use decode::{Decode, ValueError};
pub use error::{BoxError, EnvError};
pub use envbind_derive::Specification;
pub use options::{Options, DEFAULT_FILE_SUFFIX};
pub use process::{check_disallowed, must_process, process};
pub use usage::{entries, usage, usage_to, Format, UsageEntry, USAGE_HEADER};
pub use variable::{FieldMeta, FileLoading, Resolved, Source, Variable};
pub use walk::{gather, split_words, Slot, Specification};

// Re-export for macro-generated code
#[doc(hidden)]
pub use anyhow;
