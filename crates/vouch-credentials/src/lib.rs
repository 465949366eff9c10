//! Vouch Credentials: the VC/VP codec: compact signed tokens, credential
//! issuance, holder presentations, and verification against resolved DIDs.

pub mod credential;
pub mod error;
pub mod holder;
pub mod issuer;
pub mod jwt;
pub mod verifier;

pub use credential::{
    decode_credential, CredentialEnvelope, CredentialPayload, JwtProof, PresentationEnvelope,
    PresentationPayload, W3cCredential, W3cPresentation,
};
pub use error::CodecError;
pub use holder::CredentialHolder;
pub use issuer::CredentialIssuer;
pub use jwt::{DecodedJwt, JwtHeader};
pub use verifier::{CredentialVerifier, VerifiedCredential, VerifiedPresentation};
