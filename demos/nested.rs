//! Nested and flattened specifications, with unknown-variable checks

use envbind::{check_disallowed, process, Options, Specification};

#[derive(Debug, Default, Specification)]
struct Database {
    #[env(default = "localhost")]
    pub host: String,
    #[env(default = 5432)]
    pub port: u16,
}

#[derive(Debug, Default, Specification)]
struct Telemetry {
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Default, Specification)]
struct Config {
    // APP_PRIMARY_HOST, APP_PRIMARY_PORT
    pub primary: Database,

    // APP_REPLICA_HOST, APP_REPLICA_PORT; allocated during the walk
    pub replica: Option<Database>,

    // APP_OTLP_ENDPOINT: flattened fields keep the parent prefix
    #[env(flatten)]
    pub telemetry: Telemetry,
}

fn main() -> anyhow::Result<()> {
    let opts = Options::new().with_prefix("app");

    std::env::set_var("APP_PRIMARY_HOST", "db-primary.internal");
    std::env::set_var("APP_REPLICA_HOST", "db-replica.internal");
    std::env::set_var("APP_OTLP_ENDPOINT", "http://collector:4317");

    let mut config = Config::default();
    check_disallowed(&mut config, &opts)?;
    process(&mut config, &opts)?;
    println!("{config:#?}");

    // A typo is caught before it silently falls back to a default
    std::env::set_var("APP_PRIMRY_PORT", "6543");
    if let Err(err) = check_disallowed(&mut Config::default(), &opts) {
        println!("Rejected: {err}");
    }

    Ok(())
}
