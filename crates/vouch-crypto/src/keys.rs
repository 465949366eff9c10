use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use rand::rngs::OsRng;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::hashing::{from_hex, keccak256, to_prefixed_hex};

/// A secp256k1 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl PublicKey {
    /// Parse SEC1 bytes (33-byte compressed or 65-byte uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|e| CryptoError::InvalidKey(format!("bad secp256k1 public key: {}", e)))
    }

    /// Parse hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = from_hex(s).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Self::from_sec1_bytes(&bytes)
    }

    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        out
    }

    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out.copy_from_slice(self.0.to_encoded_point(false).as_bytes());
        out
    }

    /// `0x`-prefixed compressed hex.
    pub fn to_hex(&self) -> String {
        to_prefixed_hex(&self.to_compressed())
    }

    /// 20-byte Ethereum account address: last 20 bytes of keccak over the
    /// uncompressed point without its 0x04 tag.
    pub fn eth_address(&self) -> [u8; 20] {
        let hash = keccak256(&self.to_uncompressed()[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hash[12..]);
        addr
    }

    /// EIP-55 checksummed address.
    pub fn checksum_address(&self) -> String {
        checksum_address(&self.eth_address())
    }

    pub(crate) fn inner(&self) -> &k256::PublicKey {
        &self.0
    }

    pub(crate) fn from_inner(key: k256::PublicKey) -> Self {
        Self(key)
    }
}

/// EIP-55 mixed-case checksum encoding of an address.
pub fn checksum_address(addr: &[u8; 20]) -> String {
    let lower = hex::encode(addr);
    let hash = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A secp256k1 key pair. The secret scalar is zeroized on drop.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().to_hex())
            .finish()
    }
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut OsRng),
        }
    }

    /// Load from 32 raw secret bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidKey(format!("bad secp256k1 secret: {}", e)))?;
        Ok(Self { secret })
    }

    /// Load from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(from_hex(s).map_err(|e| CryptoError::InvalidKey(e.to_string()))?);
        Self::from_secret_bytes(&bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_inner(self.secret.public_key())
    }

    /// `0x`-prefixed secret hex. Callers own zeroizing the returned string.
    pub fn secret_hex(&self) -> Zeroizing<String> {
        let mut bytes: [u8; 32] = self.secret.to_bytes().into();
        let out = Zeroizing::new(to_prefixed_hex(&bytes));
        bytes.zeroize();
        out
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}
