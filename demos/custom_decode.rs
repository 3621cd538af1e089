//! Implementing `Decode` for a domain type, and using `FromStr` / `TryFrom<Vec<u8>>`

use std::str::FromStr;

use envbind::{BoxError, Decode, Specification};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum Level {
    Debug,
    #[default]
    Info,
    Warn,
}

// A custom Decode impl replaces the built-in coercion entirely
impl Decode for Level {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = match value.to_ascii_lowercase().as_str() {
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            other => return Err(format!("unknown log level '{other}'").into()),
        };
        Ok(())
    }

    fn description() -> String {
        "debug, info or warn".to_string()
    }
}

#[derive(Debug, Default)]
struct Color(u8, u8, u8);

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').ok_or("color must start with '#'")?;
        if hex.len() != 6 {
            return Err(format!("expected 6 hex digits, got '{hex}'"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Debug, Default)]
struct Fingerprint(Vec<u8>);

impl TryFrom<Vec<u8>> for Fingerprint {
    type Error = String;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() != 8 {
            return Err(format!("fingerprint must be 8 bytes, got {}", bytes.len()));
        }
        Ok(Fingerprint(bytes))
    }
}

#[derive(Debug, Default, Specification)]
struct Config {
    pub level: Level,

    #[env(from_str)]
    pub accent: Color,

    #[env(from_bytes)]
    pub fingerprint: Fingerprint,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("LEVEL", "WARN");
    std::env::set_var("ACCENT", "#ff8800");
    std::env::set_var("FINGERPRINT", "a1b2c3d4");

    let config = Config::from_env()?;
    println!("{config:#?}");

    std::env::set_var("LEVEL", "loud");
    if let Err(err) = Config::from_env() {
        println!("Rejected: {err}");
    }

    Ok(())
}
