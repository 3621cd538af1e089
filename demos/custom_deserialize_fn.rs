//! Example demonstrating custom deserializer functions

use std::collections::HashMap;

use envbind::Specification;

// Custom deserializer for semicolon-separated strings
fn semicolon_separated(s: &str) -> Result<Vec<String>, String> {
    Ok(s.split(';').map(|s| s.trim().to_string()).collect())
}

#[derive(Debug, Default, Specification)]
struct Config {
    pub app_name: String,

    // JSON through serde_json
    #[env(deserializer = "serde_json::from_str")]
    pub json_tags: Vec<String>,

    // Optional fields take a function returning the inner type
    #[env(deserializer = "serde_json::from_str")]
    pub quotas: Option<HashMap<String, u64>>,

    // Any fn(&str) -> Result<T, E> where E: Display
    #[env(deserializer = "semicolon_separated")]
    pub hosts: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("APP_NAME", "my-app");
    std::env::set_var("JSON_TAGS", r#"["prod","api","v2"]"#);
    std::env::set_var("QUOTAS", r#"{"requests": 1000, "uploads": 10}"#);
    std::env::set_var("HOSTS", "a.internal; b.internal");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  App Name: {}", config.app_name);
    println!("  JSON Tags: {:?}", config.json_tags);
    println!("  Quotas: {:?}", config.quotas);
    println!("  Hosts: {:?}", config.hosts);

    Ok(())
}
