//! `vouch verify`: Verify a credential or presentation token.

use clap::Args;
use serde_json::json;

use super::{inline_or_file, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Token (as string or path to file).
    pub token: String,

    /// Treat the token as a presentation.
    #[arg(long)]
    pub presentation: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let token = inline_or_file(&args.token)?;

    let result = if args.presentation {
        super::post(
            &args.endpoint,
            "/ssi/verified-presentation",
            &json!({ "verifiablePresentation": token }),
            "verify",
        )
        .await
    } else {
        super::post(
            &args.endpoint,
            "/ssi/verified-credential",
            &json!({ "verifiableCredential": token }),
            "verify",
        )
        .await
    };

    match result {
        Ok(content) => {
            if args.presentation {
                println!("Presentation is VALID");
                println!("  Holder: {}", content["holder"].as_str().unwrap_or_default());
                let count = content["verifiablePresentation"]["verifiableCredential"]
                    .as_array()
                    .map_or(0, Vec::len);
                println!("  Credentials: {}", count);
            } else {
                println!("Credential is VALID");
                println!("  Issuer:  {}", content["issuer"].as_str().unwrap_or_default());
                println!("  Subject: {}", content["subject"].as_str().unwrap_or_default());
            }
            println!();
            println!("{}", serde_json::to_string_pretty(&content)?);
            Ok(())
        }
        Err(e) => {
            println!("Token is INVALID");
            Err(e)
        }
    }
}
