use serde::{Deserialize, Serialize};
use vouch_core::{Did, DidMethod};
use vouch_crypto::{checksum_address, PublicKey};

use crate::error::IdentityError;

pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
pub const RECOVERY_2020_CONTEXT: &str =
    "https://w3id.org/security/suites/secp256k1recovery-2020/v2";

pub const RECOVERY_METHOD_2020: &str = "EcdsaSecp256k1RecoveryMethod2020";
pub const VERIFICATION_KEY_2019: &str = "EcdsaSecp256k1VerificationKey2019";

/// Chain id for a network name, or for a `0x`-hex chain id.
pub fn chain_id(method: DidMethod, network: &str) -> Option<u64> {
    if let Some(hex_id) = network.strip_prefix("0x") {
        return u64::from_str_radix(hex_id, 16).ok();
    }
    match (method, network) {
        (DidMethod::Ethr, "mainnet") => Some(1),
        (DidMethod::Ethr, "morden") => Some(2),
        (DidMethod::Ethr, "ropsten") => Some(3),
        (DidMethod::Ethr, "rinkeby") => Some(4),
        (DidMethod::Ethr, "goerli") => Some(5),
        (DidMethod::Ethr, "kovan") => Some(42),
        (DidMethod::Ethr, "sepolia") => Some(11_155_111),
        (DidMethod::Klay, "mainnet") | (DidMethod::Klay, "cypress") => Some(8217),
        (DidMethod::Klay, "baobab") => Some(1001),
        _ => None,
    }
}

/// A verification method within a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub controller: String,
    /// CAIP-10 account id: `eip155:<chainId>:<address>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_hex: Option<String>,
}

impl VerificationMethod {
    /// The account address at the end of `blockchainAccountId`.
    pub fn account_address(&self) -> Option<&str> {
        self.blockchain_account_id
            .as_deref()
            .and_then(|id| id.rsplit(':').next())
    }
}

/// W3C DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default)]
    pub authentication: Vec<String>,
    #[serde(default)]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// The default document of an ethr/klay DID with no registry changes.
    ///
    /// Always has a `#controller` recovery method bound to the account
    /// address. A public-key identifier also yields a `#controllerKey`.
    pub fn for_did(did: &Did) -> Result<Self, IdentityError> {
        let network = did.network_or_default();
        let chain = chain_id(did.method(), network)
            .ok_or_else(|| IdentityError::UnsupportedNetwork(network.to_string()))?;

        let public_key = did.public_key_hex().map(PublicKey::from_hex).transpose()?;
        let address = match (&public_key, did.address_hex()) {
            (Some(pk), _) => pk.checksum_address(),
            (None, Some(addr)) => {
                let raw: [u8; 20] = hex::decode(&addr[2..])
                    .ok()
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(|| IdentityError::ResolveDidFailed(did.to_string()))?;
                checksum_address(&raw)
            }
            (None, None) => return Err(IdentityError::ResolveDidFailed(did.to_string())),
        };

        let controller_id = format!("{}#controller", did);
        let mut methods = vec![VerificationMethod {
            id: controller_id.clone(),
            method_type: RECOVERY_METHOD_2020.into(),
            controller: did.to_string(),
            blockchain_account_id: Some(format!("eip155:{}:{}", chain, address)),
            public_key_hex: None,
        }];
        let mut refs = vec![controller_id];

        if let Some(pk) = &public_key {
            let key_id = format!("{}#controllerKey", did);
            methods.push(VerificationMethod {
                id: key_id.clone(),
                method_type: VERIFICATION_KEY_2019.into(),
                controller: did.to_string(),
                blockchain_account_id: None,
                public_key_hex: Some(hex::encode(pk.to_compressed())),
            });
            refs.push(key_id);
        }

        Ok(Self {
            context: vec![DID_CONTEXT.into(), RECOVERY_2020_CONTEXT.into()],
            id: did.to_string(),
            verification_method: methods,
            authentication: refs.clone(),
            assertion_method: refs,
        })
    }

    /// Find a verification method by its full id.
    pub fn find_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|m| m.id == id)
    }

    /// Public keys published by this document.
    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.verification_method
            .iter()
            .filter_map(|m| m.public_key_hex.as_deref())
            .filter_map(|h| PublicKey::from_hex(h).ok())
            .collect()
    }

    /// Whether `key` is authorized to sign for this DID, either directly or
    /// through a bound account address.
    pub fn authorizes(&self, key: &PublicKey) -> bool {
        let compressed = hex::encode(key.to_compressed());
        let address = key.checksum_address();
        self.verification_method.iter().any(|m| {
            let key_match = m
                .public_key_hex
                .as_deref()
                .and_then(|h| PublicKey::from_hex(h).ok())
                .map(|pk| hex::encode(pk.to_compressed()) == compressed)
                .unwrap_or(false);
            let addr_match = m
                .account_address()
                .map(|a| a.eq_ignore_ascii_case(&address))
                .unwrap_or(false);
            key_match || addr_match
        })
    }
}
