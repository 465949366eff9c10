use std::fmt;

use crate::claim_state::ClaimEvent;
use crate::types::ClaimStatus;

/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid claim transition from {from} on {event:?}")]
    InvalidStateTransition { from: ClaimStatus, event: ClaimEvent },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("invalid enum value for {field}: {value}")]
    InvalidEnumValue { field: &'static str, value: i64 },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStateTransition { .. } => ErrorKind::NotFound,
            Self::ValidationError(_) | Self::InvalidDid(_) | Self::InvalidEnumValue { .. } => {
                ErrorKind::ClientFault
            }
            Self::SerializationError(_) => ErrorKind::Unhandled,
        }
    }
}

/// Caller-facing error classes shared by every crate.
///
/// Each crate's error enum maps onto one of these through `kind()`; the HTTP
/// layer only ever looks at the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigurationMissing,
    ResolveDidFailed,
    VcVerificationFailed,
    VpVerificationFailed,
    PermissionDenied,
    ClientFault,
    NotFound,
    /// A downstream service answered with a failure; status and body are
    /// carried by the originating error.
    MicroserviceError,
    Unhandled,
}

impl ErrorKind {
    /// HTTP status code for this kind. Microservice errors default to
    /// 502 when the downstream status is unknown.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ConfigurationMissing | Self::Unhandled => 500,
            Self::ResolveDidFailed
            | Self::VcVerificationFailed
            | Self::VpVerificationFailed
            | Self::PermissionDenied
            | Self::ClientFault => 400,
            Self::NotFound => 404,
            Self::MicroserviceError => 502,
        }
    }

    /// Message exposed to callers. Internal causes are never surfaced.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing => "Cannot import Infura project ID",
            Self::ResolveDidFailed => "Cannot resolve DID",
            Self::VcVerificationFailed => "Cannot verify VC",
            Self::VpVerificationFailed => "Cannot verify VP",
            Self::PermissionDenied => "Permission denied",
            Self::ClientFault => "Bad request",
            Self::NotFound => "Content not found",
            Self::MicroserviceError => "Microservice error",
            Self::Unhandled => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.public_message())
    }
}
