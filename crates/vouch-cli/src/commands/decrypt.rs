//! `vouch decrypt`: Open a sealed career locally.

use clap::Args;

use super::inline_or_file;

#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Base64 sealed career (or path to a file holding it).
    #[arg(short, long)]
    pub career: String,

    /// Holder private key, hex (or path to a keystore JSON file).
    #[arg(short, long)]
    pub key: String,
}

/// A bare hex key, or the `privKey` of a keystore file.
fn private_key(value: &str) -> anyhow::Result<String> {
    let raw = inline_or_file(value)?;
    if raw.starts_with('{') {
        let keystore: vouch_core::Keystore = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid keystore file: {}", e))?;
        return Ok(keystore.priv_key.clone());
    }
    Ok(raw)
}

pub fn run(args: &DecryptArgs) -> anyhow::Result<()> {
    let career = inline_or_file(&args.career)?;
    let key = private_key(&args.key)?;
    let vc = vouch_lifecycle::decrypt_career(&career, &key)?;
    println!("{}", vc);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_from_hex() {
        assert_eq!(private_key("0xabc").unwrap(), "0xabc");
    }

    #[test]
    fn test_private_key_from_keystore_file() {
        let keystore = vouch_identity::generate_keystore("ropsten").unwrap();
        let path = std::env::temp_dir().join(format!("vouch-keystore-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&keystore).unwrap()).unwrap();
        let key = private_key(path.to_str().unwrap()).unwrap();
        assert_eq!(key, keystore.priv_key);
        std::fs::remove_file(&path).ok();
    }
}
