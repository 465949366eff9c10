//! `vouch keygen`: Generate a keystore locally.

use clap::Args;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Network the DID is anchored on.
    #[arg(short, long, default_value = "ropsten")]
    pub network: String,

    /// Write the keystore JSON to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    let keystore = vouch_identity::generate_keystore(&args.network)?;
    let json = serde_json::to_string_pretty(&keystore)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Keystore written to {}", path.display());
            println!("  DID:     {}", keystore.did);
            println!("  Address: {}", keystore.wallet_address);
        }
        None => println!("{}", json),
    }
    Ok(())
}
