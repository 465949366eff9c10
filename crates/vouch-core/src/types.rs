use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroize;

use crate::error::CoreError;

/// Network implied by a DID that carries no network segment.
pub const DEFAULT_NETWORK: &str = "mainnet";

/// DID methods understood by the credential codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DidMethod {
    Ethr,
    Klay,
}

impl DidMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethr => "ethr",
            Self::Klay => "klay",
        }
    }
}

impl FromStr for DidMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ethr" => Ok(Self::Ethr),
            "klay" => Ok(Self::Klay),
            other => Err(CoreError::InvalidDid(format!(
                "unsupported DID method: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for DidMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decentralized Identifier.
/// Format: `did:<method>:<network>?:<0x-hex identifier>`
///
/// The identifier is either a 20-byte account address or a secp256k1 public
/// key (compressed or uncompressed). Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse and validate a full DID URI.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let parts: Vec<&str> = uri.split(':').collect();
        if parts.first() != Some(&"did") {
            return Err(CoreError::InvalidDid(format!(
                "DID must start with 'did:', got: {}",
                uri
            )));
        }
        if parts.len() != 3 && parts.len() != 4 {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:<method>:<network>?:<identifier>', got: {}",
                uri
            )));
        }
        parts[1].parse::<DidMethod>()?;
        if parts.len() == 4 && parts[2].is_empty() {
            return Err(CoreError::InvalidDid(format!("empty network segment: {}", uri)));
        }
        validate_identifier(parts[parts.len() - 1])?;
        Ok(Self(uri))
    }

    /// Build a DID from its components. `mainnet` is never written out.
    pub fn from_parts(
        method: DidMethod,
        network: Option<&str>,
        identifier: &str,
    ) -> Result<Self, CoreError> {
        match network {
            Some(net) if net != DEFAULT_NETWORK => {
                Self::new(format!("did:{}:{}:{}", method, net, identifier))
            }
            _ => Self::new(format!("did:{}:{}", method, identifier)),
        }
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    pub fn method(&self) -> DidMethod {
        match self.0.split(':').nth(1) {
            Some("klay") => DidMethod::Klay,
            _ => DidMethod::Ethr,
        }
    }

    /// The explicit network segment, if the DID has four segments.
    pub fn network(&self) -> Option<&str> {
        let parts: Vec<&str> = self.0.split(':').collect();
        if parts.len() == 4 {
            Some(parts[2])
        } else {
            None
        }
    }

    /// Network segment, or `mainnet` when it is absent.
    pub fn network_or_default(&self) -> &str {
        self.network().unwrap_or(DEFAULT_NETWORK)
    }

    /// The `0x`-prefixed hex identifier (last segment).
    pub fn identifier(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or_default()
    }

    /// The identifier when it encodes a public key rather than an address.
    pub fn public_key_hex(&self) -> Option<&str> {
        let id = self.identifier();
        matches!(id.len() - 2, 66 | 130).then_some(id)
    }

    /// The identifier when it encodes a 20-byte account address.
    pub fn address_hex(&self) -> Option<&str> {
        let id = self.identifier();
        (id.len() - 2 == 40).then_some(id)
    }
}

fn validate_identifier(id: &str) -> Result<(), CoreError> {
    let hex_part = id
        .strip_prefix("0x")
        .ok_or_else(|| CoreError::InvalidDid(format!("identifier must be 0x-prefixed: {}", id)))?;
    if !matches!(hex_part.len(), 40 | 66 | 130) {
        return Err(CoreError::InvalidDid(format!(
            "identifier must be an address or public key, got {} hex chars",
            hex_part.len()
        )));
    }
    hex::decode(hex_part)
        .map_err(|e| CoreError::InvalidDid(format!("identifier is not hex: {}", e)))?;
    Ok(())
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directory role of a user. Encoded as 0/1 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Employer,
    Employee,
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        match role {
            Role::Employer => 0,
            Role::Employee => 1,
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Employer),
            1 => Ok(Self::Employee),
            _ => Err(CoreError::InvalidEnumValue {
                field: "user_type",
                value: value.into(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Employer => write!(f, "Employer"),
            Self::Employee => write!(f, "Employee"),
        }
    }
}

/// Status of a claim. Encoded as 0/1/2 in persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ClaimStatus {
    /// Awaiting the issuer's decision.
    Pending,
    /// Issuer attested the claim. Final state.
    Accepted,
    /// Issuer declined the claim. Final state.
    Rejected,
}

impl From<ClaimStatus> for u8 {
    fn from(status: ClaimStatus) -> Self {
        match status {
            ClaimStatus::Pending => 0,
            ClaimStatus::Accepted => 1,
            ClaimStatus::Rejected => 2,
        }
    }
}

impl TryFrom<u8> for ClaimStatus {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Rejected),
            _ => Err(CoreError::InvalidEnumValue {
                field: "status",
                value: value.into(),
            }),
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// How a claim's career artifact is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CareerType {
    /// Issuer-signed VC, sealed under the holder's public key.
    EncVc,
    /// Reference into the content-addressed store.
    IpfsHash,
}

impl From<CareerType> for u8 {
    fn from(kind: CareerType) -> Self {
        match kind {
            CareerType::EncVc => 0,
            CareerType::IpfsHash => 1,
        }
    }
}

impl TryFrom<u8> for CareerType {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::EncVc),
            1 => Ok(Self::IpfsHash),
            _ => Err(CoreError::InvalidEnumValue {
                field: "careerType",
                value: value.into(),
            }),
        }
    }
}

impl fmt::Display for CareerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncVc => write!(f, "ENC_VC"),
            Self::IpfsHash => write!(f, "IPFS_HASH"),
        }
    }
}

/// Body of an employment claim. Signed verbatim as `credentialSubject`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimContent {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(rename = "where", default)]
    pub workplace: String,
    #[serde(default)]
    pub what: String,
}

impl ClaimContent {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        workplace: impl Into<String>,
        what: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            workplace: workplace.into(),
            what: what.into(),
        }
    }
}

/// Key material for one DID. The private key is supplied by the caller per
/// signing operation and never persisted server-side.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keystore {
    pub did: Did,
    pub wallet_address: String,
    pub priv_key: String,
    pub pub_key: String,
}

impl fmt::Debug for Keystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keystore")
            .field("did", &self.did)
            .field("wallet_address", &self.wallet_address)
            .field("priv_key", &"<redacted>")
            .field("pub_key", &self.pub_key)
            .finish()
    }
}

impl Drop for Keystore {
    fn drop(&mut self) {
        self.priv_key.zeroize();
    }
}
