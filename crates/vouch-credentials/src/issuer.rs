use serde::Serialize;
use vouch_core::{CredentialConfig, Did};
use vouch_crypto::KeyPair;
use vouch_identity::DidDocument;

use crate::credential::{CredentialEnvelope, CredentialPayload};
use crate::error::CodecError;
use crate::jwt;

/// Issues credential tokens signed with the issuer's key.
#[derive(Debug, Clone, Default)]
pub struct CredentialIssuer {
    config: CredentialConfig,
}

impl CredentialIssuer {
    pub fn new(config: CredentialConfig) -> Self {
        Self { config }
    }

    /// Create a VC asserting `claim` about `holder`, signed by `issuer`.
    ///
    /// With a fixed `nbf` policy the token is byte-identical for identical
    /// inputs.
    pub fn create_vc<S: Serialize>(
        &self,
        holder: &Did,
        claim: &S,
        issuer: &Did,
        issuer_priv_key: &str,
    ) -> Result<String, CodecError> {
        let subject = serde_json::to_value(claim)?;
        if !subject.as_object().is_some_and(|fields| !fields.is_empty()) {
            return Err(CodecError::InvalidEnvelope(
                "credentialSubject must be a non-empty object".into(),
            ));
        }
        let keypair = KeyPair::from_hex(issuer_priv_key)?;
        ensure_key_controls(issuer, &keypair)?;

        let payload = CredentialPayload {
            vc: CredentialEnvelope::new(claim),
            sub: holder.to_string(),
            nbf: self.config.not_before_now(),
            iss: issuer.to_string(),
            exp: None,
        };
        let token = jwt::encode_signed(&payload, &keypair)?;

        tracing::info!(
            issuer = %issuer,
            subject = %holder,
            nbf = payload.nbf,
            "credential issued"
        );

        Ok(token)
    }
}

/// Reject keys that could never verify under `did`'s default document.
/// DIDs on networks without a known document are not checked.
pub(crate) fn ensure_key_controls(did: &Did, keypair: &KeyPair) -> Result<(), CodecError> {
    match DidDocument::for_did(did) {
        Ok(doc) if !doc.authorizes(&keypair.public_key()) => {
            Err(CodecError::KeyMismatch(did.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::{ClaimContent, NotBeforePolicy};
    use vouch_identity::generate_keystore;

    #[test]
    fn test_create_vc_is_deterministic() {
        let issuer = generate_keystore("ropsten").unwrap();
        let holder = generate_keystore("ropsten").unwrap();
        let content = ClaimContent::new("2019-01", "2021-06", "Acme", "Engineer");

        let codec = CredentialIssuer::default();
        let a = codec.create_vc(&holder.did, &content, &issuer.did, &issuer.priv_key).unwrap();
        let b = codec.create_vc(&holder.did, &content, &issuer.did, &issuer.priv_key).unwrap();
        assert_eq!(a, b);

        let decoded = jwt::decode(&a).unwrap();
        assert_eq!(decoded.payload["sub"], holder.did.uri());
        assert_eq!(decoded.payload["iss"], issuer.did.uri());
        assert_eq!(decoded.payload["nbf"], 1_562_950_282);
        assert_eq!(decoded.payload["vc"]["credentialSubject"]["where"], "Acme");
        assert!(decoded.payload.get("iat").is_none());
    }

    #[test]
    fn test_issuance_time_policy() {
        let issuer = generate_keystore("ropsten").unwrap();
        let holder = generate_keystore("ropsten").unwrap();
        let config = CredentialConfig {
            not_before: NotBeforePolicy::IssuanceTime,
            ..Default::default()
        };
        let before = chrono::Utc::now().timestamp();
        let token = CredentialIssuer::new(config)
            .create_vc(&holder.did, &ClaimContent::default(), &issuer.did, &issuer.priv_key)
            .unwrap();
        let nbf = jwt::decode(&token).unwrap().payload["nbf"].as_i64().unwrap();
        assert!(nbf >= before);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let issuer = generate_keystore("ropsten").unwrap();
        let holder = generate_keystore("ropsten").unwrap();
        let err = CredentialIssuer::default()
            .create_vc(&holder.did, &ClaimContent::default(), &issuer.did, &holder.priv_key)
            .unwrap_err();
        assert!(matches!(err, CodecError::KeyMismatch(_)));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let issuer = generate_keystore("ropsten").unwrap();
        let holder = generate_keystore("ropsten").unwrap();
        let codec = CredentialIssuer::default();
        for subject in [serde_json::json!({}), serde_json::json!("text"), serde_json::json!([1])] {
            let err = codec
                .create_vc(&holder.did, &subject, &issuer.did, &issuer.priv_key)
                .unwrap_err();
            assert!(matches!(err, CodecError::InvalidEnvelope(_)));
            assert_eq!(err.kind(), vouch_core::ErrorKind::ClientFault);
        }
    }

    #[test]
    fn test_bad_private_key() {
        let issuer = generate_keystore("ropsten").unwrap();
        let err = CredentialIssuer::default()
            .create_vc(&issuer.did, &ClaimContent::default(), &issuer.did, "0xnothex")
            .unwrap_err();
        assert_eq!(err.kind(), vouch_core::ErrorKind::ClientFault);
    }
}
