//! Vouch Core: Fundamental types, errors, and configuration for
//! DID-backed employment credentials.

pub mod claim_state;
pub mod config;
pub mod error;
pub mod types;

pub use claim_state::{ClaimEvent, ClaimStateMachine};
pub use config::{CredentialConfig, NotBeforePolicy};
pub use error::{CoreError, ErrorKind};
pub use types::{CareerType, ClaimContent, ClaimStatus, Did, DidMethod, Keystore, Role};
