use vouch_core::{Did, DidMethod, Keystore};
use vouch_crypto::KeyPair;

use crate::document::chain_id;
use crate::error::IdentityError;

/// Generate a fresh keystore whose DID embeds the compressed public key.
///
/// `mainnet` DIDs carry no network segment.
pub fn generate_keystore(network: &str) -> Result<Keystore, IdentityError> {
    let keypair = KeyPair::generate();
    let keystore = keystore_from_keypair(&keypair, network)?;
    tracing::info!(did = %keystore.did, network, "generated DID");
    Ok(keystore)
}

/// Build the keystore for an existing key pair on `network`.
pub fn keystore_from_keypair(keypair: &KeyPair, network: &str) -> Result<Keystore, IdentityError> {
    if chain_id(DidMethod::Ethr, network).is_none() {
        return Err(IdentityError::UnsupportedNetwork(network.to_string()));
    }
    let public_key = keypair.public_key();
    let pub_hex = public_key.to_hex();
    let did = Did::from_parts(DidMethod::Ethr, Some(network), &pub_hex)?;

    Ok(Keystore {
        did,
        wallet_address: public_key.checksum_address(),
        priv_key: keypair.secret_hex().to_string(),
        pub_key: pub_hex,
    })
}

/// Rebuild a keystore from a hex private key.
pub fn keystore_from_private_key(priv_hex: &str, network: &str) -> Result<Keystore, IdentityError> {
    let keypair = KeyPair::from_hex(priv_hex)?;
    keystore_from_keypair(&keypair, network)
}

/// The signing key held by a keystore.
pub fn keypair_from_keystore(keystore: &Keystore) -> Result<KeyPair, IdentityError> {
    Ok(KeyPair::from_hex(&keystore.priv_key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keystore_ropsten() {
        let ks = generate_keystore("ropsten").unwrap();
        assert_eq!(ks.did.network(), Some("ropsten"));
        assert_eq!(ks.did.identifier(), ks.pub_key);
        assert_eq!(ks.did.public_key_hex(), Some(ks.pub_key.as_str()));
        assert!(ks.wallet_address.starts_with("0x"));
        assert_eq!(ks.wallet_address.len(), 42);
        assert!(ks.priv_key.starts_with("0x"));
        assert_eq!(ks.priv_key.len(), 66);
    }

    #[test]
    fn test_mainnet_keystore_has_no_network_segment() {
        let ks = generate_keystore("mainnet").unwrap();
        assert_eq!(ks.did.network(), None);
        assert_eq!(ks.did.uri(), format!("did:ethr:{}", ks.pub_key));
    }

    #[test]
    fn test_keystore_from_private_key_is_stable() {
        let ks = generate_keystore("goerli").unwrap();
        let again = keystore_from_private_key(&ks.priv_key, "goerli").unwrap();
        assert_eq!(again.did, ks.did);
        assert_eq!(again.wallet_address, ks.wallet_address);

        let kp = keypair_from_keystore(&ks).unwrap();
        assert_eq!(kp.public_key().to_hex(), ks.pub_key);
    }

    #[test]
    fn test_unsupported_network() {
        assert!(matches!(
            generate_keystore("atlantis"),
            Err(IdentityError::UnsupportedNetwork(_))
        ));
    }
}
