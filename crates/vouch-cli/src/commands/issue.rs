//! `vouch issue`: Issue a verifiable credential.

use clap::Args;
use serde::Serialize;

use super::{inline_or_file, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Holder (subject) DID.
    #[arg(long)]
    pub holder: String,

    /// Issuer DID.
    #[arg(long)]
    pub issuer: String,

    /// Issuer private key, hex.
    #[arg(long)]
    pub issuer_key: String,

    /// Claim JSON object (as string or path to file).
    #[arg(short, long)]
    pub claim: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct IssueRequest {
    #[serde(rename = "holderDID")]
    holder_did: String,
    claim: serde_json::Value,
    #[serde(rename = "issuerDID")]
    issuer_did: String,
    #[serde(rename = "issuerPriv")]
    issuer_priv: String,
}

pub async fn run(args: &IssueArgs) -> anyhow::Result<()> {
    let claim: serde_json::Value = serde_json::from_str(&inline_or_file(&args.claim)?)
        .map_err(|e| anyhow::anyhow!("invalid claim JSON: {}", e))?;
    if !claim.is_object() {
        anyhow::bail!("claim must be a JSON object");
    }

    let body = IssueRequest {
        holder_did: args.holder.clone(),
        claim,
        issuer_did: args.issuer.clone(),
        issuer_priv: args.issuer_key.clone(),
    };
    let vc = super::post(&args.endpoint, "/ssi/verifiable-credential", &body, "issue").await?;
    println!("{}", vc.as_str().unwrap_or_default());
    Ok(())
}
