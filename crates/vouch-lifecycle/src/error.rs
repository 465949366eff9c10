use vouch_core::{CoreError, ErrorKind};
use vouch_credentials::CodecError;
use vouch_crypto::CryptoError;
use vouch_identity::IdentityError;

/// Claim and resume workflow errors.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("bad request: {0}")]
    ClientFault(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("content store returned HTTP {status} for {hash}")]
    ContentStore { hash: String, status: u16, body: String },

    #[error("content store unreachable: {0}")]
    ContentStoreUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::ClientFault(_) | Self::Crypto(_) => ErrorKind::ClientFault,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ContentStore { .. } | Self::ContentStoreUnavailable(_) => {
                ErrorKind::MicroserviceError
            }
            Self::Storage(_) => ErrorKind::Unhandled,
            Self::Identity(e) => e.kind(),
            Self::Codec(e) => e.kind(),
            Self::Core(e) => e.kind(),
        }
    }

    /// Status and body to relay when a downstream service failed.
    pub fn downstream(&self) -> Option<(u16, String)> {
        match self {
            Self::ContentStore { status, body, .. } => Some((*status, body.clone())),
            Self::ContentStoreUnavailable(msg) => Some((503, msg.clone())),
            Self::Identity(e) => e.downstream(),
            _ => None,
        }
    }
}
