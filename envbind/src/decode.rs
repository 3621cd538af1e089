//! String-to-value coercion for field types
//!
//! Every field of a [`Specification`](crate::Specification) implements [`Decode`].
//! The built-in impls cover scalars, durations, addresses and paths, plus the
//! composite grammar:
//!
//! - **Sequences** (`Vec<T>`): comma-separated items, each decoded as `T`.
//!   `Vec<u8>` takes the raw bytes of the value instead.
//! - **Mappings** (`HashMap<K, V>`, `BTreeMap<K, V>`): comma-separated `key:value` pairs.
//! - **Optional/boxed** (`Option<T>`, `Box<T>`): the pointee is allocated on first decode.
//!
//! A blank value decodes to an empty sequence or mapping.
//!
//! Integers auto-detect their base (`0x1F`, `0o17`, `0b101`, `017`) and accept `_`
//! between digits. Values that do not fit the field's width are rejected.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::hash::{BuildHasher, Hash};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::num::IntErrorKind;
use std::path::PathBuf;

use crate::error::BoxError;
use crate::walk::Slot;

/// Coercion failures below the field level.
///
/// These end up as the `source` of [`EnvError::Parse`](crate::EnvError::Parse).
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("invalid syntax for integer: {value:?}")]
    InvalidInteger { value: String },

    #[error("value {value:?} out of range for {type_name}")]
    OutOfRange {
        value: String,
        type_name: &'static str,
    },

    #[error("invalid syntax for bool: {value:?}")]
    InvalidBool { value: String },

    #[error("invalid map item: {0:?}")]
    InvalidMapItem(String),

    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration {
        value: String,
        reason: &'static str,
    },
}

/// A type that can be bound to a configuration key.
///
/// Implement this for your own types to take over conversion entirely: the
/// field is then treated as a single leaf, never walked into, and the built-in
/// coercion is bypassed even when the type wraps a primitive.
///
/// ```rust
/// use envbind::{BoxError, Decode};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Level(u8);
///
/// impl Decode for Level {
///     fn decode(&mut self, value: &str) -> Result<(), BoxError> {
///         self.0 = match value {
///             "low" => 1,
///             "high" => 9,
///             other => return Err(format!("unknown level {other}").into()),
///         };
///         Ok(())
///     }
/// }
///
/// let mut level = Level::default();
/// level.decode("high").unwrap();
/// assert_eq!(level, Level(9));
/// ```
pub trait Decode {
    /// Replace `self` with the value parsed from `value`.
    fn decode(&mut self, value: &str) -> Result<(), BoxError>;

    /// Human-readable type description shown in usage output.
    fn description() -> String
    where
        Self: Sized,
    {
        short_type_name::<Self>()
    }

    /// How the walker treats a field of this type.
    ///
    /// Derived specifications return [`Slot::Nested`]; everything else is a leaf.
    fn slot(&mut self) -> Slot<'_>
    where
        Self: Sized,
    {
        Slot::Leaf(self)
    }

    /// Whether [`slot`](Decode::slot) returns [`Slot::Nested`], known without an instance.
    fn is_nested() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// Decode a `Vec<Self>` from a comma-separated list.
    fn decode_seq(value: &str) -> Result<Vec<Self>, BoxError>
    where
        Self: Sized + Default,
    {
        if value.trim().is_empty() {
            return Ok(Vec::new());
        }

        value
            .split(',')
            .map(|item| {
                let mut element = Self::default();
                element.decode(item)?;
                Ok(element)
            })
            .collect()
    }

    /// Usage description of a `Vec<Self>`.
    fn seq_description() -> String
    where
        Self: Sized,
    {
        format!("Comma-separated list of {}", Self::description())
    }
}

/// Last path segment of a type name, without generics (`alloc::vec::Vec<u8>` → `Vec`).
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

impl Decode for String {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = value.to_string();
        Ok(())
    }

    fn description() -> String {
        "String".to_string()
    }
}

impl Decode for bool {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = parse_bool(value).ok_or_else(|| ValueError::InvalidBool {
            value: value.to_string(),
        })?;
        Ok(())
    }

    fn description() -> String {
        "True or False".to_string()
    }
}

/// Canonical boolean tokens: `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn invalid_integer(value: &str) -> ValueError {
    ValueError::InvalidInteger {
        value: value.to_string(),
    }
}

fn out_of_range(value: &str, type_name: &'static str) -> ValueError {
    ValueError::OutOfRange {
        value: value.to_string(),
        type_name,
    }
}

/// Parse an unsigned magnitude with base auto-detection.
fn parse_magnitude(value: &str, digits: &str, type_name: &'static str) -> Result<u128, ValueError> {
    let (radix, rest, prefixed) = match digits.as_bytes() {
        [b'0', b'x' | b'X', ..] => (16, &digits[2..], true),
        [b'0', b'o' | b'O', ..] => (8, &digits[2..], true),
        [b'0', b'b' | b'B', ..] => (2, &digits[2..], true),
        [b'0', _, ..] => (8, &digits[1..], true),
        _ => (10, digits, false),
    };

    // `_` may only separate digits, or follow a base prefix
    if rest.is_empty()
        || rest.ends_with('_')
        || rest.contains("__")
        || (!prefixed && rest.starts_with('_'))
    {
        return Err(invalid_integer(value));
    }

    let cleaned = rest.replace('_', "");
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(invalid_integer(value));
    }

    u128::from_str_radix(&cleaned, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => out_of_range(value, type_name),
        _ => invalid_integer(value),
    })
}

fn signed<T: TryFrom<i128>>(value: &str, type_name: &'static str) -> Result<T, ValueError> {
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let magnitude = parse_magnitude(value, digits, type_name)?;
    let parsed = if negative {
        if magnitude == 1u128 << 127 {
            i128::MIN
        } else {
            -i128::try_from(magnitude).map_err(|_| out_of_range(value, type_name))?
        }
    } else {
        i128::try_from(magnitude).map_err(|_| out_of_range(value, type_name))?
    };

    T::try_from(parsed).map_err(|_| out_of_range(value, type_name))
}

fn unsigned<T: TryFrom<u128>>(value: &str, type_name: &'static str) -> Result<T, ValueError> {
    let magnitude = parse_magnitude(value, value, type_name)?;
    T::try_from(magnitude).map_err(|_| out_of_range(value, type_name))
}

macro_rules! decode_signed {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            fn decode(&mut self, value: &str) -> Result<(), BoxError> {
                *self = signed(value, stringify!($ty))?;
                Ok(())
            }

            fn description() -> String {
                "Integer".to_string()
            }
        }
    )*};
}

macro_rules! decode_unsigned {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            fn decode(&mut self, value: &str) -> Result<(), BoxError> {
                *self = unsigned(value, stringify!($ty))?;
                Ok(())
            }

            fn description() -> String {
                "Unsigned Integer".to_string()
            }
        }
    )*};
}

decode_signed!(i8, i16, i32, i64, i128, isize);
decode_unsigned!(u16, u32, u64, u128, usize);

// `Vec<u8>` holds the raw bytes of the value rather than a comma list.
impl Decode for u8 {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = unsigned(value, "u8")?;
        Ok(())
    }

    fn description() -> String {
        "Unsigned Integer".to_string()
    }

    fn decode_seq(value: &str) -> Result<Vec<Self>, BoxError> {
        Ok(value.as_bytes().to_vec())
    }

    fn seq_description() -> String {
        "String".to_string()
    }
}

/// Whether `value` spells infinity or NaN rather than overflowing into it.
fn is_non_finite_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix(|c| c == '+' || c == '-').unwrap_or(value);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|token| unsigned.eq_ignore_ascii_case(token))
}

macro_rules! decode_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            fn decode(&mut self, value: &str) -> Result<(), BoxError> {
                let parsed = value.parse::<$ty>()?;
                if !parsed.is_finite() && !is_non_finite_literal(value) {
                    return Err(out_of_range(value, stringify!($ty)).into());
                }
                *self = parsed;
                Ok(())
            }

            fn description() -> String {
                "Float".to_string()
            }
        }
    )*};
}

decode_float!(f32, f64);

macro_rules! decode_from_str {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            fn decode(&mut self, value: &str) -> Result<(), BoxError> {
                *self = value.parse::<$ty>()?;
                Ok(())
            }
        }
    )*};
}

decode_from_str!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

impl Decode for PathBuf {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = PathBuf::from(value);
        Ok(())
    }
}

impl Decode for OsString {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = OsString::from(value);
        Ok(())
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = T::decode_seq(value)?;
        Ok(())
    }

    fn description() -> String {
        T::seq_description()
    }
}

/// Split `k1:v1,k2:v2` into decoded pairs. Each pair must have exactly one `:`.
fn decode_pairs<K, V>(value: &str) -> Result<Vec<(K, V)>, BoxError>
where
    K: Decode + Default,
    V: Decode + Default,
{
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }

    value
        .split(',')
        .map(|pair| {
            let mut parts = pair.split(':');
            let (Some(raw_key), Some(raw_value), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(ValueError::InvalidMapItem(pair.to_string()).into());
            };

            let mut key = K::default();
            key.decode(raw_key)?;
            let mut val = V::default();
            val.decode(raw_value)?;
            Ok((key, val))
        })
        .collect()
}

fn pairs_description<K: Decode, V: Decode>() -> String {
    format!(
        "Comma-separated list of {}:{} pairs",
        K::description(),
        V::description()
    )
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Default + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher + Default,
{
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = decode_pairs::<K, V>(value)?.into_iter().collect();
        Ok(())
    }

    fn description() -> String {
        pairs_description::<K, V>()
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Default + Ord,
    V: Decode + Default,
{
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = decode_pairs::<K, V>(value)?.into_iter().collect();
        Ok(())
    }

    fn description() -> String {
        pairs_description::<K, V>()
    }
}

impl<T: Decode + Default> Decode for Option<T> {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        self.get_or_insert_with(T::default).decode(value)
    }

    fn description() -> String {
        T::description()
    }

    // Nested specifications are allocated up front so their fields can be bound;
    // a leaf stays `None` until a value is found.
    fn slot(&mut self) -> Slot<'_> {
        if T::is_nested() {
            self.get_or_insert_with(T::default).slot()
        } else {
            Slot::Leaf(self)
        }
    }

    fn is_nested() -> bool {
        T::is_nested()
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        (**self).decode(value)
    }

    fn description() -> String {
        T::description()
    }

    fn slot(&mut self) -> Slot<'_> {
        (**self).slot()
    }

    fn is_nested() -> bool {
        T::is_nested()
    }
}
