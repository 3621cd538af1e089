//! Lists, maps, durations and integers with base prefixes

use std::collections::HashMap;
use std::time::Duration;

use envbind::{process, Options, Specification};

#[derive(Debug, Default, Specification)]
struct Config {
    // Comma-separated: "api,worker"
    pub roles: Vec<String>,

    // key:value pairs: "us-east:3,eu-west:2"
    pub replicas: HashMap<String, u8>,

    // Go-style durations: "1m30s", "250ms"
    #[env(default = "1m30s")]
    pub shutdown_grace: Duration,

    // 0x, 0o, 0b and leading-zero octal are all accepted
    #[env(default = "0o644")]
    pub file_mode: u32,

    // Raw bytes, not split on commas
    pub banner: Vec<u8>,

    // Stays None unless SVC_METRICS_PORT is set
    pub metrics_port: Option<u16>,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("SVC_ROLES", "api,worker");
    std::env::set_var("SVC_REPLICAS", "us-east:3,eu-west:2");
    std::env::set_var("SVC_BANNER", "hello, world");

    let mut config = Config::default();
    process(&mut config, &Options::new().with_prefix("svc"))?;

    println!("Roles: {:?}", config.roles);
    println!("Replicas: {:?}", config.replicas);
    println!("Shutdown grace: {:?}", config.shutdown_grace);
    println!("File mode: {:o}", config.file_mode);
    println!("Banner: {}", String::from_utf8_lossy(&config.banner));
    println!("Metrics port: {:?}", config.metrics_port);

    Ok(())
}
