//! File-based configuration example

use std::io::Write;

use envbind::{Options, Specification};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Specification)]
struct Config {
    // Loaded from API_KEY, or from the file named by API_KEY_FILE
    #[env(required)]
    pub api_key: String,

    // Custom suffix: DATABASE_PASSWORD_PATH names the file
    #[env(required, file = "_PATH")]
    pub database_password: String,

    // Never read from a file
    #[env(file = false)]
    pub database_host: String,
}

fn main() -> anyhow::Result<()> {
    let mut api_key_file = NamedTempFile::new()?;
    writeln!(api_key_file, "super_secret_api_key_12345")?;

    let mut db_password_file = NamedTempFile::new()?;
    writeln!(db_password_file, "db_password_67890")?;

    std::env::set_var("API_KEY_FILE", api_key_file.path());
    std::env::set_var("DATABASE_PASSWORD_PATH", db_password_file.path());
    std::env::set_var("DATABASE_HOST", "localhost");

    // Trailing newlines in secret files are trimmed
    let config = Config::from_env()?;

    println!("Configuration loaded from files:");
    println!("  API Key: {}", config.api_key);
    println!("  Database Password: {}", config.database_password);
    println!("  Database Host: {}", config.database_host);

    // Only explicitly tagged fields read files once the default is turned off
    let opts = Options::new().without_default_loading_from_files();
    match Config::from_env_with(&opts) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("Without default file loading: {err}"),
    }

    Ok(())
}
