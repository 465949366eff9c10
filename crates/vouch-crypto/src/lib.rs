//! Vouch Crypto: secp256k1 key handling, ES256K(-R) signatures,
//! ECIES sealing of issued credentials, and hashing.

pub mod encryption;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use encryption::{decrypt, decrypt_base64, encrypt, encrypt_base64, EncryptedPayload};
pub use error::CryptoError;
pub use hashing::{keccak256, sha256};
pub use keys::{checksum_address, KeyPair, PublicKey};
pub use signing::{recover_es256k_r, sign_es256k_r, verify_es256k, RecoverableSignature};
