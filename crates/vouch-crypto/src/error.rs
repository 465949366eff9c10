/// Errors from secp256k1 keys, ES256K signatures and ECIES sealing.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Malformed hex, an off-curve point or a zero scalar.
    #[error("invalid secp256k1 key: {0}")]
    InvalidKey(String),

    #[error("wrong key size: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("ES256K signature does not verify")]
    SignatureVerificationFailed,

    /// Wrong length, bad recovery id, or no key recoverable.
    #[error("malformed signature: {0}")]
    InvalidSignature(String),

    #[error("ES256K signing failed: {0}")]
    SigningError(String),

    #[error("sealing failed: {0}")]
    EncryptionError(String),

    /// Also covers truncated payloads and AES-GCM tag mismatches.
    #[error("cannot open sealed payload: {0}")]
    DecryptionError(String),

    #[error("HKDF expansion failed: {0}")]
    KeyDerivationError(String),
}
