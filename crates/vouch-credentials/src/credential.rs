//! Credential and presentation envelopes, and their normalized W3C views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::jwt;

pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";
pub const VERIFIABLE_PRESENTATION: &str = "VerifiablePresentation";
pub const JWT_PROOF_2020: &str = "JwtProof2020";

/// The `vc` member of a credential token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialEnvelope<S> {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: S,
}

impl<S> CredentialEnvelope<S> {
    pub fn new(credential_subject: S) -> Self {
        Self {
            context: vec![CREDENTIALS_CONTEXT.into()],
            types: vec![VERIFIABLE_CREDENTIAL.into()],
            credential_subject,
        }
    }
}

/// Claims of a credential token. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialPayload<S> {
    pub vc: CredentialEnvelope<S>,
    pub sub: String,
    pub nbf: i64,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// The `vp` member of a presentation token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationEnvelope {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<String>,
}

impl PresentationEnvelope {
    pub fn new(verifiable_credential: Vec<String>) -> Self {
        Self {
            context: vec![CREDENTIALS_CONTEXT.into()],
            types: vec![VERIFIABLE_PRESENTATION.into()],
            verifiable_credential,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationPayload {
    pub vp: PresentationEnvelope,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtProof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub jwt: String,
}

impl JwtProof {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self {
            proof_type: JWT_PROOF_2020.into(),
            jwt: jwt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRef {
    pub id: String,
}

/// A credential in W3C data-model form, as recovered from a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct W3cCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Signed subject claims plus `id` (the holder DID).
    pub credential_subject: Map<String, Value>,
    pub issuer: IssuerRef,
    pub issuance_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    pub proof: JwtProof,
}

impl W3cCredential {
    /// Holder DID (`credentialSubject.id`).
    pub fn holder(&self) -> Option<&str> {
        self.credential_subject.get("id").and_then(Value::as_str)
    }

    /// The subject claims without the `id` entry, deserialized as `T`.
    pub fn subject_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, CodecError> {
        let mut claims = self.credential_subject.clone();
        claims.remove("id");
        Ok(serde_json::from_value(Value::Object(claims))?)
    }
}

/// A presentation in W3C data-model form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct W3cPresentation {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub holder: String,
    pub verifiable_credential: Vec<W3cCredential>,
    pub proof: JwtProof,
}

fn check_context_and_type(context: &[String], types: &[String], expected: &str) -> Result<(), CodecError> {
    if !context.iter().any(|c| c == CREDENTIALS_CONTEXT) {
        return Err(CodecError::InvalidEnvelope(format!(
            "@context must include {}",
            CREDENTIALS_CONTEXT
        )));
    }
    if !types.iter().any(|t| t == expected) {
        return Err(CodecError::InvalidEnvelope(format!("type must include {}", expected)));
    }
    Ok(())
}

fn timestamp_to_rfc3339(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Check a credential payload's shape and build its W3C view.
pub(crate) fn normalize_credential(token: &str, payload: &Value) -> Result<W3cCredential, CodecError> {
    let payload: CredentialPayload<Value> = serde_json::from_value(payload.clone())
        .map_err(|e| CodecError::InvalidEnvelope(format!("credential payload: {}", e)))?;
    check_context_and_type(&payload.vc.context, &payload.vc.types, VERIFIABLE_CREDENTIAL)?;

    let mut subject = match payload.vc.credential_subject {
        Value::Object(map) if !map.is_empty() => map,
        _ => {
            return Err(CodecError::InvalidEnvelope(
                "credentialSubject must be a non-empty object".into(),
            ))
        }
    };
    subject.insert("id".into(), Value::String(payload.sub.clone()));

    Ok(W3cCredential {
        context: payload.vc.context,
        types: payload.vc.types,
        credential_subject: subject,
        issuer: IssuerRef { id: payload.iss },
        issuance_date: timestamp_to_rfc3339(payload.nbf),
        expiration_date: payload.exp.map(timestamp_to_rfc3339),
        proof: JwtProof::new(token),
    })
}

/// Decode a credential token and check its structure. The signature is
/// not verified.
pub fn decode_credential(token: &str) -> Result<W3cCredential, CodecError> {
    let decoded = jwt::decode(token)?;
    normalize_credential(token.trim(), &decoded.payload)
}
