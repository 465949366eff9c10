//! `vouch present`: Wrap credentials in a verifiable presentation.

use clap::Args;
use serde::Serialize;

use super::{inline_or_file, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct PresentArgs {
    /// Holder DID.
    #[arg(long)]
    pub holder: String,

    /// Holder private key, hex.
    #[arg(long)]
    pub holder_key: String,

    /// Credential token (or path to a file holding it). Repeat to add more.
    #[arg(long = "vc", required = true)]
    pub credentials: Vec<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresentRequest {
    #[serde(rename = "holderDID")]
    holder_did: String,
    holder_priv: String,
    verifiable_credentials: Vec<String>,
}

pub async fn run(args: &PresentArgs) -> anyhow::Result<()> {
    let verifiable_credentials = args
        .credentials
        .iter()
        .map(|c| inline_or_file(c))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let body = PresentRequest {
        holder_did: args.holder.clone(),
        holder_priv: args.holder_key.clone(),
        verifiable_credentials,
    };
    let vp = super::post(&args.endpoint, "/ssi/verifiable-presentation", &body, "present").await?;
    println!("{}", vp.as_str().unwrap_or_default());
    Ok(())
}
