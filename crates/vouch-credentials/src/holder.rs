use vouch_core::Did;
use vouch_crypto::KeyPair;

use crate::credential::{PresentationEnvelope, PresentationPayload};
use crate::error::CodecError;
use crate::issuer::ensure_key_controls;
use crate::jwt;

/// Builds presentations over credentials a holder already has.
#[derive(Debug, Clone, Default)]
pub struct CredentialHolder;

impl CredentialHolder {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `vc_tokens`, in order, in a presentation signed by the holder.
    pub fn create_vp(
        &self,
        holder: &Did,
        holder_priv_key: &str,
        vc_tokens: &[String],
    ) -> Result<String, CodecError> {
        if vc_tokens.is_empty() {
            return Err(CodecError::EmptyPresentation);
        }
        let keypair = KeyPair::from_hex(holder_priv_key)?;
        ensure_key_controls(holder, &keypair)?;

        let payload = PresentationPayload {
            vp: PresentationEnvelope::new(vc_tokens.to_vec()),
            iss: holder.to_string(),
            nbf: None,
            exp: None,
        };
        let token = jwt::encode_signed(&payload, &keypair)?;

        tracing::info!(
            holder = %holder,
            credentials = vc_tokens.len(),
            "presentation created"
        );

        Ok(token)
    }
}
