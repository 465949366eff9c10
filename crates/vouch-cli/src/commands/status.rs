//! `vouch status`: Query the health of a running node.

use clap::Args;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let content = super::get(&args.endpoint, "/health", "status").await?;
    println!("Vouch node at {}", args.endpoint);
    println!("  Status:  {}", content["status"].as_str().unwrap_or("unknown"));
    println!("  Version: {}", content["version"].as_str().unwrap_or("unknown"));
    println!("  Uptime:  {}s", content["uptime_secs"]);
    Ok(())
}
