//! Basic usage example

use envbind::Specification;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Specification)]
#[env(prefix = "myapp")]
struct Config {
    // Required field: loaded from MYAPP_DATABASE_URL
    #[env(required)]
    pub database_url: String,

    // With default value
    #[env(default = "127.0.0.1:8080")]
    pub server_addr: String,

    // Loaded from MYAPP_MAX_CONNECTIONS thanks to split_words
    #[env(split_words, default = 10)]
    #[allow(non_snake_case)]
    pub MaxConnections: u32,

    #[env(default = false)]
    pub debug_mode: bool,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=envbind=debug shows where every value came from
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Set environment variables for demonstration
    std::env::set_var("MYAPP_DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("MYAPP_SERVER_ADDR", "0.0.0.0:3000");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Max Connections: {}", config.MaxConnections);
    println!("  Debug Mode: {}", config.debug_mode);

    Ok(())
}
