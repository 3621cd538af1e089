//! Conversion strategies selected by field attributes
//!
//! Each adapter borrows the field it writes into and implements [`Decode`], so
//! the walker treats it like any other leaf:
//!
//! - `#[env(deserializer = "path")]` → [`WithFn`]
//! - `#[env(from_str)]` → [`Text`]
//! - `#[env(from_bytes)]` → [`Bytes`]

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::decode::Decode;
use crate::error::BoxError;

/// Decodes through a user-supplied `fn(&str) -> Result<T, E>`.
pub struct WithFn<'a, T, F, E> {
    target: &'a mut T,
    parse: F,
    _error: PhantomData<fn() -> E>,
}

impl<'a, T, F, E> WithFn<'a, T, F, E>
where
    F: Fn(&str) -> Result<T, E>,
{
    pub fn new(target: &'a mut T, parse: F) -> Self {
        Self {
            target,
            parse,
            _error: PhantomData,
        }
    }
}

impl<T, F, E> Decode for WithFn<'_, T, F, E>
where
    F: Fn(&str) -> Result<T, E>,
    E: Display,
{
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self.target = (self.parse)(value).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Decodes through the field type's [`FromStr`] impl.
pub struct Text<'a, T>(&'a mut T);

impl<'a, T> Text<'a, T> {
    pub fn new(target: &'a mut T) -> Self {
        Self(target)
    }
}

impl<T> Decode for Text<'_, T>
where
    T: FromStr,
    T::Err: Display,
{
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self.0 = value.parse::<T>().map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Decodes the raw bytes of the value through `TryFrom<Vec<u8>>`.
///
/// Values are always UTF-8 text, so a binary secret file is rejected before it
/// reaches the conversion.
pub struct Bytes<'a, T>(&'a mut T);

impl<'a, T> Bytes<'a, T> {
    pub fn new(target: &'a mut T) -> Self {
        Self(target)
    }
}

impl<T> Decode for Bytes<'_, T>
where
    T: TryFrom<Vec<u8>>,
    <T as TryFrom<Vec<u8>>>::Error: Display,
{
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self.0 = T::try_from(value.as_bytes().to_vec()).map_err(|e| e.to_string())?;
        Ok(())
    }
}
