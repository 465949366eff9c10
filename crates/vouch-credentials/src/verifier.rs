use std::sync::Arc;
use vouch_core::{CredentialConfig, Did};
use vouch_crypto::{recover_es256k_r, verify_es256k, RecoverableSignature};
use vouch_identity::DidResolver;

use crate::credential::{
    normalize_credential, JwtProof, PresentationPayload, W3cCredential, W3cPresentation,
    CREDENTIALS_CONTEXT, VERIFIABLE_PRESENTATION,
};
use crate::error::CodecError;
use crate::jwt::{self, DecodedJwt, ALG_ES256K, ALG_ES256K_R};

/// A credential whose signature checked out against its issuer's DID.
#[derive(Debug, Clone)]
pub struct VerifiedCredential {
    pub jwt: String,
    pub issuer: Did,
    pub subject: Did,
    pub payload: serde_json::Value,
    pub verifiable_credential: W3cCredential,
}

/// A presentation whose signature checked out against its holder's DID.
/// Embedded credentials are decoded, not re-verified.
#[derive(Debug, Clone)]
pub struct VerifiedPresentation {
    pub jwt: String,
    pub holder: Did,
    pub payload: serde_json::Value,
    pub credential_jwts: Vec<String>,
    pub verifiable_presentation: W3cPresentation,
}

/// Verifies credential and presentation tokens.
pub struct CredentialVerifier {
    resolver: Arc<dyn DidResolver>,
    clock_skew_secs: i64,
}

impl CredentialVerifier {
    pub fn new(resolver: Arc<dyn DidResolver>, config: &CredentialConfig) -> Self {
        Self {
            resolver,
            clock_skew_secs: config.clock_skew_secs,
        }
    }

    /// Verify a credential token. Every failure surfaces as
    /// `VcVerificationFailed`; the cause is logged.
    pub async fn verify_vc(&self, token: &str) -> Result<VerifiedCredential, CodecError> {
        self.check_vc(token.trim()).await.map_err(|e| {
            tracing::warn!(error = %e, "credential verification failed");
            CodecError::VcVerificationFailed
        })
    }

    /// Verify a presentation token. Every failure surfaces as
    /// `VpVerificationFailed`; the cause is logged.
    pub async fn verify_vp(&self, token: &str) -> Result<VerifiedPresentation, CodecError> {
        self.check_vp(token.trim()).await.map_err(|e| {
            tracing::warn!(error = %e, "presentation verification failed");
            CodecError::VpVerificationFailed
        })
    }

    async fn check_vc(&self, token: &str) -> Result<VerifiedCredential, CodecError> {
        let decoded = jwt::decode(token)?;
        let issuer = claim_did(&decoded.payload, "iss")?;
        let subject = claim_did(&decoded.payload, "sub")?;
        self.check_time(&decoded.payload)?;
        let verifiable_credential = normalize_credential(token, &decoded.payload)?;
        self.check_signature(&decoded, &issuer).await?;

        tracing::debug!(issuer = %issuer, subject = %subject, "credential verified");

        Ok(VerifiedCredential {
            jwt: token.to_string(),
            issuer,
            subject,
            payload: decoded.payload,
            verifiable_credential,
        })
    }

    async fn check_vp(&self, token: &str) -> Result<VerifiedPresentation, CodecError> {
        let decoded = jwt::decode(token)?;
        let holder = claim_did(&decoded.payload, "iss")?;
        self.check_time(&decoded.payload)?;

        let payload: PresentationPayload = serde_json::from_value(decoded.payload.clone())
            .map_err(|e| CodecError::InvalidEnvelope(format!("presentation payload: {}", e)))?;
        if !payload.vp.context.iter().any(|c| c == CREDENTIALS_CONTEXT)
            || !payload.vp.types.iter().any(|t| t == VERIFIABLE_PRESENTATION)
        {
            return Err(CodecError::InvalidEnvelope(
                "vp must carry the credentials context and VerifiablePresentation type".into(),
            ));
        }

        let credentials = payload
            .vp
            .verifiable_credential
            .iter()
            .map(|vc| {
                let inner = jwt::decode(vc)?;
                normalize_credential(vc.trim(), &inner.payload)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.check_signature(&decoded, &holder).await?;

        tracing::debug!(holder = %holder, credentials = credentials.len(), "presentation verified");

        Ok(VerifiedPresentation {
            jwt: token.to_string(),
            holder: holder.clone(),
            payload: decoded.payload,
            credential_jwts: payload.vp.verifiable_credential,
            verifiable_presentation: W3cPresentation {
                context: payload.vp.context,
                types: payload.vp.types,
                holder: holder.to_string(),
                verifiable_credential: credentials,
                proof: JwtProof::new(token),
            },
        })
    }

    fn check_time(&self, payload: &serde_json::Value) -> Result<(), CodecError> {
        let now = chrono::Utc::now().timestamp();
        if let Some(nbf) = payload.get("nbf").and_then(serde_json::Value::as_i64) {
            if nbf > now + self.clock_skew_secs {
                return Err(CodecError::NotYetValid(nbf));
            }
        }
        if let Some(exp) = payload.get("exp").and_then(serde_json::Value::as_i64) {
            if exp <= now - self.clock_skew_secs {
                return Err(CodecError::Expired(exp));
            }
        }
        Ok(())
    }

    async fn check_signature(&self, decoded: &DecodedJwt, signer: &Did) -> Result<(), CodecError> {
        let document = self.resolver.resolve(signer).await?;
        let message = decoded.signing_input.as_bytes();

        let authorized = match decoded.header.alg.as_str() {
            ALG_ES256K_R => {
                let signature = RecoverableSignature::from_bytes(&decoded.signature)?;
                let key = recover_es256k_r(message, &signature)?;
                document.authorizes(&key)
            }
            ALG_ES256K => {
                let sig = decoded.signature.get(..64).unwrap_or(&decoded.signature[..]);
                document
                    .public_keys()
                    .iter()
                    .any(|key| verify_es256k(key, message, sig).is_ok())
            }
            other => return Err(CodecError::UnsupportedAlgorithm(other.to_string())),
        };

        if authorized {
            Ok(())
        } else {
            Err(CodecError::SignerNotAuthorized(signer.to_string()))
        }
    }
}

fn claim_did(payload: &serde_json::Value, claim: &str) -> Result<Did, CodecError> {
    let value = payload
        .get(claim)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| CodecError::InvalidEnvelope(format!("missing '{}' claim", claim)))?;
    Ok(Did::new(value)?)
}
