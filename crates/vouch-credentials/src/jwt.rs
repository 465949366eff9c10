//! JWS compact serialization (RFC 7515): `base64url(header).base64url(claims).base64url(signature)`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use vouch_crypto::{sign_es256k_r, KeyPair};

use crate::error::CodecError;

pub const ALG_ES256K_R: &str = "ES256K-R";
pub const ALG_ES256K: &str = "ES256K";
pub const TYP_JWT: &str = "JWT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl JwtHeader {
    pub fn es256k_r() -> Self {
        Self {
            alg: ALG_ES256K_R.into(),
            typ: Some(TYP_JWT.into()),
        }
    }
}

/// A token split into its parts. The signature is not checked.
#[derive(Debug, Clone)]
pub struct DecodedJwt {
    pub header: JwtHeader,
    pub payload: serde_json::Value,
    pub signature: Vec<u8>,
    /// `header.payload` exactly as it appeared in the token.
    pub signing_input: String,
}

fn b64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn unb64(part: &str, what: &str) -> Result<Vec<u8>, CodecError> {
    URL_SAFE_NO_PAD
        .decode(part.trim_end_matches('='))
        .map_err(|e| CodecError::Malformed(format!("{} is not base64url: {}", what, e)))
}

/// Serialize `payload`, sign it ES256K-R with `keypair`, return the token.
pub fn encode_signed<T: Serialize>(payload: &T, keypair: &KeyPair) -> Result<String, CodecError> {
    let header = serde_json::to_vec(&JwtHeader::es256k_r())?;
    let body = serde_json::to_vec(payload)?;
    let signing_input = format!("{}.{}", b64(&header), b64(&body));
    let signature = sign_es256k_r(keypair, signing_input.as_bytes())?;
    Ok(format!("{}.{}", signing_input, b64(signature.as_bytes())))
}

/// Split and decode a token.
pub fn decode(token: &str) -> Result<DecodedJwt, CodecError> {
    let token = token.trim();
    let mut parts = token.split('.');
    let (header_part, payload_part, sig_part) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => return Err(CodecError::Malformed("expected three dot-separated parts".into())),
    };

    let header: JwtHeader = serde_json::from_slice(&unb64(header_part, "header")?)
        .map_err(|e| CodecError::Malformed(format!("header: {}", e)))?;
    let payload: serde_json::Value = serde_json::from_slice(&unb64(payload_part, "payload")?)
        .map_err(|e| CodecError::Malformed(format!("payload: {}", e)))?;
    if !payload.is_object() {
        return Err(CodecError::Malformed("payload is not a JSON object".into()));
    }
    let signature = unb64(sig_part, "signature")?;

    Ok(DecodedJwt {
        header,
        payload,
        signature,
        signing_input: format!("{}.{}", header_part, payload_part),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_crypto::{recover_es256k_r, RecoverableSignature};

    #[test]
    fn test_encode_decode() {
        let kp = KeyPair::generate();
        let token = encode_signed(&serde_json::json!({"iss": "me", "n": 1}), &kp).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));

        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.header, JwtHeader::es256k_r());
        assert_eq!(decoded.payload["n"], 1);
        assert_eq!(decoded.signature.len(), 65);

        let sig = RecoverableSignature::from_bytes(&decoded.signature).unwrap();
        let recovered = recover_es256k_r(decoded.signing_input.as_bytes(), &sig).unwrap();
        assert_eq!(recovered, kp.public_key());
    }

    #[test]
    fn test_header_bytes() {
        let kp = KeyPair::generate();
        let token = encode_signed(&serde_json::json!({}), &kp).unwrap();
        let header = URL_SAFE_NO_PAD.decode(token.split('.').next().unwrap()).unwrap();
        assert_eq!(header, br#"{"alg":"ES256K-R","typ":"JWT"}"#);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("").is_err());
        assert!(decode("a.b").is_err());
        assert!(decode("a.b.c.d").is_err());
        assert!(decode("!!!.???.***").is_err());
        let not_object = format!("{}.{}.{}", b64(br#"{"alg":"ES256K-R"}"#), b64(b"[1,2]"), b64(b"sig"));
        assert!(decode(&not_object).is_err());
    }
}
