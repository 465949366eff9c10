//! Credential issuance configuration.

use serde::{Deserialize, Serialize};

/// `nbf` stamped on credentials when no other policy is configured.
pub const FIXED_NOT_BEFORE: i64 = 1_562_950_282;

/// How the `nbf` claim of a newly issued credential is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NotBeforePolicy {
    /// Always the same timestamp. Issuance is deterministic for equal inputs.
    Fixed { timestamp: i64 },
    /// The wall-clock time of issuance.
    IssuanceTime,
}

impl NotBeforePolicy {
    /// Resolve the policy against the current unix time.
    pub fn resolve(&self, now: i64) -> i64 {
        match self {
            Self::Fixed { timestamp } => *timestamp,
            Self::IssuanceTime => now,
        }
    }
}

impl Default for NotBeforePolicy {
    fn default() -> Self {
        Self::Fixed {
            timestamp: FIXED_NOT_BEFORE,
        }
    }
}

/// Settings shared by credential creation and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Network used for freshly generated DIDs.
    #[serde(default = "default_chain")]
    pub default_chain: String,

    /// Tolerance applied to `nbf` and `exp` checks.
    #[serde(default = "default_clock_skew_secs")]
    pub clock_skew_secs: i64,

    #[serde(default)]
    pub not_before: NotBeforePolicy,
}

fn default_chain() -> String {
    "ropsten".into()
}
fn default_clock_skew_secs() -> i64 {
    300
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            default_chain: default_chain(),
            clock_skew_secs: default_clock_skew_secs(),
            not_before: NotBeforePolicy::default(),
        }
    }
}

impl CredentialConfig {
    /// The `nbf` value for a credential issued now.
    pub fn not_before_now(&self) -> i64 {
        self.not_before.resolve(chrono::Utc::now().timestamp())
    }
}
