use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::error::CryptoError;
use crate::hashing::sha256;
use crate::keys::{KeyPair, PublicKey};

/// A 65-byte recoverable ECDSA signature: `r ‖ s ‖ recovery_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableSignature(pub [u8; 65]);

impl RecoverableSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 65] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 65,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

/// Sign `message` with ES256K-R: ECDSA secp256k1 over SHA-256, with the
/// recovery id appended so verifiers can recover the signer's key.
pub fn sign_es256k_r(keypair: &KeyPair, message: &[u8]) -> Result<RecoverableSignature, CryptoError> {
    let signing_key = SigningKey::from(keypair.secret());
    let digest = sha256(message);
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| CryptoError::SigningError(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(RecoverableSignature(out))
}

/// Recover the public key that produced an ES256K-R signature over `message`.
pub fn recover_es256k_r(
    message: &[u8],
    signature: &RecoverableSignature,
) -> Result<PublicKey, CryptoError> {
    let bytes = signature.as_bytes();
    let sig = Signature::from_slice(&bytes[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    // Some signers emit 27/28 in the Ethereum tradition.
    let v = if bytes[64] >= 27 { bytes[64] - 27 } else { bytes[64] };
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| CryptoError::InvalidSignature(format!("bad recovery id {}", bytes[64])))?;

    let digest = sha256(message);
    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| CryptoError::SignatureVerificationFailed)?;
    Ok(PublicKey::from_inner(k256::PublicKey::from(&verifying_key)))
}

/// Verify a plain 64-byte ES256K signature (`r ‖ s`) over `message`.
pub fn verify_es256k(
    public_key: &PublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let sig = Signature::from_slice(signature)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let sig = sig.normalize_s().unwrap_or(sig);
    let verifying_key = VerifyingKey::from(public_key.inner());
    verifying_key
        .verify_prehash(&sha256(message), &sig)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}
