//! Rendering usage documentation for a specification

use std::time::Duration;

use envbind::{usage, usage_to, Format, Options, Specification};

#[derive(Debug, Default, Specification)]
struct Config {
    /// Address to bind the HTTP listener to
    #[env(default = "0.0.0.0:8080")]
    pub listen: String,

    /// Token used to authenticate against the upstream API
    #[env(required, split_words)]
    #[allow(non_snake_case)]
    pub UpstreamToken: String,

    #[env(default = "30s", desc = "Request timeout")]
    pub timeout: Duration,

    /// Extra CORS origins
    pub allowed_origins: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let opts = Options::new().with_prefix("gateway");

    usage(&mut Config::default(), &opts)?;

    println!();
    let mut stdout = std::io::stdout();
    usage_to(&mut Config::default(), &opts, &mut stdout, &Format::List)?;

    println!();
    let format = Format::Template("export {key}={default}  # {type}\n".to_string());
    usage_to(&mut Config::default(), &opts, &mut stdout, &format)?;

    println!();
    usage_to(&mut Config::default(), &opts, &mut stdout, &Format::Json)?;

    Ok(())
}
