use crate::error::CoreError;
use crate::types::{CareerType, ClaimStatus};

impl ClaimStatus {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// Issuer decisions that move a claim out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimEvent {
    Accept,
    Reject,
}

/// Claim status transitions.
///
/// Valid transitions:
/// - Pending → Accepted (Accept), ENC_VC only
/// - Pending → Rejected (Reject), ENC_VC only
///
/// IPFS_HASH claims are born Accepted and never move.
pub struct ClaimStateMachine;

impl ClaimStateMachine {
    /// Status a freshly created claim starts in.
    pub fn initial(career_type: CareerType) -> ClaimStatus {
        match career_type {
            CareerType::EncVc => ClaimStatus::Pending,
            CareerType::IpfsHash => ClaimStatus::Accepted,
        }
    }

    /// Attempt a transition. Returns the new status on success.
    pub fn transition(
        current: ClaimStatus,
        career_type: CareerType,
        event: ClaimEvent,
    ) -> Result<ClaimStatus, CoreError> {
        let new_state = match (current, career_type, event) {
            (ClaimStatus::Pending, CareerType::EncVc, ClaimEvent::Accept) => ClaimStatus::Accepted,
            (ClaimStatus::Pending, CareerType::EncVc, ClaimEvent::Reject) => ClaimStatus::Rejected,
            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event,
                })
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            career_type = %career_type,
            event = ?event,
            "claim state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: ClaimStatus, career_type: CareerType, event: ClaimEvent) -> bool {
        Self::transition(current, career_type, event).is_ok()
    }
}
