use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hkdf::Hkdf;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::{KeyPair, PublicKey};

/// AES-256-GCM with the 16-byte nonce eciesjs uses.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

const EPHEMERAL_LEN: usize = 65;
const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = EPHEMERAL_LEN + NONCE_LEN + TAG_LEN;

/// Sealed payload: ephemeral public key, nonce, tag and ciphertext.
#[derive(Debug, Clone)]
pub struct EncryptedPayload {
    /// Uncompressed ephemeral secp256k1 public key.
    pub ephemeral_pubkey: [u8; EPHEMERAL_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Serialize to bytes: ephemeral_pubkey (65) + nonce (16) + tag (16) + ciphertext.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.ephemeral_pubkey);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < HEADER_LEN {
            return Err(CryptoError::DecryptionError("payload too short".into()));
        }
        let mut ephemeral_pubkey = [0u8; EPHEMERAL_LEN];
        ephemeral_pubkey.copy_from_slice(&bytes[..EPHEMERAL_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[EPHEMERAL_LEN..EPHEMERAL_LEN + NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[EPHEMERAL_LEN + NONCE_LEN..HEADER_LEN]);
        Ok(Self {
            ephemeral_pubkey,
            nonce,
            tag,
            ciphertext: bytes[HEADER_LEN..].to_vec(),
        })
    }
}

/// Uncompressed encoding of `secret * public`.
fn shared_point(secret: &SecretKey, public: &PublicKey) -> [u8; 65] {
    let product = public.inner().to_projective() * *secret.to_nonzero_scalar();
    let affine = AffinePoint::from(product);
    let mut out = [0u8; 65];
    out.copy_from_slice(affine.to_encoded_point(false).as_bytes());
    out
}

/// HKDF-SHA256 over `ephemeral ‖ shared`, no salt, no info.
fn derive_key(ephemeral: &[u8; 65], shared: &[u8; 65]) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let mut master = Zeroizing::new([0u8; 130]);
    master[..65].copy_from_slice(ephemeral);
    master[65..].copy_from_slice(shared);

    let hk = Hkdf::<Sha256>::new(None, master.as_slice());
    let mut key = Zeroizing::new([0u8; 32]);
    hk.expand(&[], &mut key[..])
        .map_err(|e| CryptoError::KeyDerivationError(e.to_string()))?;
    Ok(key)
}

/// Seal `plaintext` to a secp256k1 public key (ECIES).
///
/// A fresh ephemeral key agrees a point with the recipient; the AES-256-GCM
/// key is derived from both points. Only the holder of the matching secret
/// key can open the payload.
pub fn encrypt(recipient: &PublicKey, plaintext: &[u8]) -> Result<EncryptedPayload, CryptoError> {
    let ephemeral = SecretKey::random(&mut OsRng);
    let ephemeral_pub = PublicKey::from_inner(ephemeral.public_key());
    let ephemeral_pubkey = ephemeral_pub.to_uncompressed();

    let shared = shared_point(&ephemeral, recipient);
    let key = derive_key(&ephemeral_pubkey, &shared)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm16::new_from_slice(key.as_slice())
        .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&nonce), b"", &mut buffer)
        .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(EncryptedPayload {
        ephemeral_pubkey,
        nonce,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Open a payload sealed by [`encrypt`].
pub fn decrypt(recipient: &KeyPair, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
    let ephemeral = PublicKey::from_sec1_bytes(&payload.ephemeral_pubkey)
        .map_err(|e| CryptoError::DecryptionError(e.to_string()))?;
    let shared = shared_point(recipient.secret(), &ephemeral);
    let key = derive_key(&payload.ephemeral_pubkey, &shared)?;

    let cipher = Aes256Gcm16::new_from_slice(key.as_slice())
        .map_err(|e| CryptoError::DecryptionError(e.to_string()))?;
    let mut buffer = payload.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(&payload.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&payload.tag),
        )
        .map_err(|_| {
            tracing::debug!(len = payload.ciphertext.len(), "sealed payload failed authentication");
            CryptoError::DecryptionError("authentication failed".into())
        })?;
    Ok(buffer)
}

/// Seal and encode as standard padded base64.
pub fn encrypt_base64(recipient: &PublicKey, plaintext: &[u8]) -> Result<String, CryptoError> {
    Ok(STANDARD.encode(encrypt(recipient, plaintext)?.to_bytes()))
}

/// Decode standard base64 and open.
pub fn decrypt_base64(recipient: &KeyPair, sealed: &str) -> Result<Vec<u8>, CryptoError> {
    let bytes = STANDARD
        .decode(sealed.trim())
        .map_err(|e| CryptoError::DecryptionError(format!("bad base64: {}", e)))?;
    decrypt(recipient, &EncryptedPayload::from_bytes(&bytes)?)
}
