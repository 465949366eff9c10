//! `vouch resolve`: Resolve a DID to its document.

use clap::Args;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// The DID to resolve.
    pub did: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &ResolveArgs) -> anyhow::Result<()> {
    let did = vouch_core::Did::new(args.did.as_str())?;
    let document = super::get(
        &args.endpoint,
        &format!("/ssi/did-document/{}", did),
        "resolve",
    )
    .await?;
    println!("DID: {}", did);
    println!("Document:\n{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
