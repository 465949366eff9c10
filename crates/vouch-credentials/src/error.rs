use vouch_core::{CoreError, ErrorKind};
use vouch_crypto::CryptoError;
use vouch_identity::IdentityError;

/// Credential codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("signature does not match any key of {0}")]
    SignerNotAuthorized(String),

    #[error("signing key does not belong to {0}")]
    KeyMismatch(String),

    #[error("token not valid before {0}")]
    NotYetValid(i64),

    #[error("token expired at {0}")]
    Expired(i64),

    #[error("a presentation needs at least one credential")]
    EmptyPresentation,

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot verify VC")]
    VcVerificationFailed,

    #[error("Cannot verify VP")]
    VpVerificationFailed,
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VcVerificationFailed => ErrorKind::VcVerificationFailed,
            Self::VpVerificationFailed => ErrorKind::VpVerificationFailed,
            Self::Identity(e) => e.kind(),
            Self::Core(e) => e.kind(),
            Self::Serialization(_) => ErrorKind::Unhandled,
            _ => ErrorKind::ClientFault,
        }
    }
}
