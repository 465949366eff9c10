use vouch_core::{CoreError, ErrorKind};
use vouch_crypto::CryptoError;

/// Identity and DID-related errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Infura project id is not configured")]
    InfuraProjectIdMissing,

    #[error("DID resolution failed: {0}")]
    ResolveDidFailed(String),

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("registry RPC error: {0}")]
    Registry(String),

    #[error("missing access token")]
    MissingToken,

    /// The directory answered with a non-success status.
    #[error("directory returned HTTP {status}")]
    Directory { status: u16, body: String },

    #[error("directory unreachable: {0}")]
    DirectoryUnavailable(String),

    #[error("malformed directory response: {0}")]
    DirectoryResponse(String),
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) => e.kind(),
            Self::Crypto(_) => ErrorKind::ClientFault,
            Self::InfuraProjectIdMissing => ErrorKind::ConfigurationMissing,
            Self::ResolveDidFailed(_) | Self::UnsupportedNetwork(_) | Self::Registry(_) => {
                ErrorKind::ResolveDidFailed
            }
            Self::MissingToken => ErrorKind::PermissionDenied,
            Self::Directory { .. } | Self::DirectoryUnavailable(_) | Self::DirectoryResponse(_) => {
                ErrorKind::MicroserviceError
            }
        }
    }

    /// Status and body to relay when a downstream service failed.
    pub fn downstream(&self) -> Option<(u16, String)> {
        match self {
            Self::Directory { status, body } => Some((*status, body.clone())),
            Self::DirectoryUnavailable(msg) => Some((503, msg.clone())),
            Self::DirectoryResponse(msg) => Some((502, msg.clone())),
            _ => None,
        }
    }
}
