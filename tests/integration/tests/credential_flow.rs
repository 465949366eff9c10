//! Integration tests for the credential codec and the key material
//! underneath it.
//!
//! Tests cover:
//! 1. VC issuance and verification against a locally resolved DID
//! 2. VP issuance with credentials kept in order
//! 3. Tampered signatures and foreign signing keys
//! 4. Keystore generation and ECIES sealing
//! 5. Resolution without a configured Infura project id

use std::sync::Arc;

use async_trait::async_trait;
use vouch_core::{ClaimContent, CredentialConfig, Did, ErrorKind};
use vouch_credentials::{decode_credential, CodecError, CredentialHolder, CredentialVerifier};
use vouch_crypto::{checksum_address, decrypt_base64, encrypt_base64, KeyPair, PublicKey};
use vouch_identity::{
    generate_keystore, DidDocument, DidResolver, IdentityError, NetworkDidResolver,
    NetworkResolverConfig, RegistryClient,
};
use vouch_integration_tests::{engineer, World};

// ============================================================================
// Helper functions
// ============================================================================

/// Flip the first character of the signature segment.
fn tamper_signature(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').expect("three segments");
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", head, chars.into_iter().collect::<String>())
}

/// Registry stub that answers every lookup with the default document.
struct DefaultDocumentRegistry;

#[async_trait]
impl RegistryClient for DefaultDocumentRegistry {
    async fn lookup(&self, _rpc_url: &str, did: &Did) -> Result<Option<DidDocument>, IdentityError> {
        Ok(Some(DidDocument::for_did(did)?))
    }
}

// ============================================================================
// Verifiable credentials
// ============================================================================

#[tokio::test]
async fn test_issued_credential_verifies() {
    let world = World::new();
    let content = engineer();
    let token = world.issue_direct(&content);

    let verified = world.verifier.verify_vc(&token).await.expect("verify VC");
    assert_eq!(verified.subject, world.employee.did);
    assert_eq!(verified.issuer, world.employer.did);
    assert_eq!(verified.jwt, token);

    let subject: ClaimContent = verified
        .verifiable_credential
        .subject_as()
        .expect("subject content");
    assert_eq!(subject, content);
    assert_eq!(
        verified.verifiable_credential.holder(),
        Some(world.employee.did.uri())
    );
}

#[tokio::test]
async fn test_tampered_credential_rejected() {
    let world = World::new();
    let token = world.issue_direct(&engineer());

    let err = world
        .verifier
        .verify_vc(&tamper_signature(&token))
        .await
        .expect_err("tampered token must not verify");
    assert!(matches!(err, CodecError::VcVerificationFailed));
    assert_eq!(err.kind(), ErrorKind::VcVerificationFailed);
}

#[tokio::test]
async fn test_issuing_with_foreign_key_refused() {
    let world = World::new();
    let result = vouch_credentials::CredentialIssuer::default().create_vc(
        &world.employee.did,
        &engineer(),
        &world.employer.did,
        &world.employee.priv_key,
    );
    assert!(matches!(result, Err(CodecError::KeyMismatch(_))));
}

#[test]
fn test_fixed_not_before_is_deterministic() {
    let world = World::new();
    let first = world.issue_direct(&engineer());
    let second = world.issue_direct(&engineer());
    assert_eq!(first, second);

    let decoded = decode_credential(&first).expect("decode");
    assert_eq!(decoded.issuer.id, world.employer.did.to_string());
}

// ============================================================================
// Verifiable presentations
// ============================================================================

#[tokio::test]
async fn test_presentation_keeps_credentials_in_order() {
    let world = World::new();
    let first = world.issue_direct(&engineer());
    let second =
        world.issue_direct(&ClaimContent::new("2021-07", "2023-02", "Initech", "Staff Engineer"));
    let vcs = vec![second.clone(), first.clone()];

    let vp = CredentialHolder::new()
        .create_vp(&world.employee.did, &world.employee.priv_key, &vcs)
        .expect("create VP");
    let verified = world.verifier.verify_vp(&vp).await.expect("verify VP");

    assert_eq!(verified.holder, world.employee.did);
    assert_eq!(verified.credential_jwts, vcs);
    let embedded: Vec<_> = verified
        .verifiable_presentation
        .verifiable_credential
        .iter()
        .map(|vc| vc.proof.jwt.clone())
        .collect();
    assert_eq!(embedded, vec![second, first]);
}

#[tokio::test]
async fn test_tampered_presentation_rejected() {
    let world = World::new();
    let vp = CredentialHolder::new()
        .create_vp(
            &world.employee.did,
            &world.employee.priv_key,
            &[world.issue_direct(&engineer())],
        )
        .expect("create VP");

    let err = world
        .verifier
        .verify_vp(&tamper_signature(&vp))
        .await
        .expect_err("tampered presentation must not verify");
    assert_eq!(err.kind(), ErrorKind::VpVerificationFailed);
}

// ============================================================================
// Key material
// ============================================================================

#[test]
fn test_keystore_identifier_is_public_key() {
    let keystore = generate_keystore("ropsten").expect("keystore");
    assert_eq!(keystore.did.identifier(), keystore.pub_key);

    let public = PublicKey::from_hex(&keystore.pub_key).expect("public key");
    assert_eq!(keystore.wallet_address, checksum_address(&public.eth_address()));
    assert_ne!(
        keystore.wallet_address,
        keystore.wallet_address.to_lowercase(),
        "checksum address should carry mixed case"
    );
}

#[test]
fn test_sealed_career_opens_only_for_recipient() {
    let holder = KeyPair::generate();
    let stranger = KeyPair::generate();
    let sealed = encrypt_base64(&holder.public_key(), b"career token").expect("seal");

    assert_eq!(decrypt_base64(&holder, &sealed).expect("open"), b"career token");
    assert!(decrypt_base64(&stranger, &sealed).is_err());

    let mut bytes = sealed.into_bytes();
    let mid = bytes.len() / 2;
    bytes[mid] = if bytes[mid] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).expect("ascii");
    assert!(decrypt_base64(&holder, &tampered).is_err());
}

// ============================================================================
// Network resolution
// ============================================================================

#[tokio::test]
async fn test_missing_project_id_fails_on_resolution() {
    let keystore = generate_keystore("ropsten").expect("keystore");
    let resolver = Arc::new(NetworkDidResolver::new(
        NetworkResolverConfig::default(),
        Arc::new(DefaultDocumentRegistry),
    ));

    // Construction succeeds; the missing id only surfaces per lookup.
    let err = resolver
        .resolve(&keystore.did)
        .await
        .expect_err("no project id configured");
    assert!(matches!(err, IdentityError::InfuraProjectIdMissing));
    assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);

    let verifier = CredentialVerifier::new(resolver, &CredentialConfig::default());
    let world = World::new();
    let token = world.issue_direct(&engineer());
    assert!(verifier.verify_vc(&token).await.is_err());
}

#[tokio::test]
async fn test_configured_project_id_resolves() {
    let keystore = generate_keystore("ropsten").expect("keystore");
    let config = NetworkResolverConfig {
        infura_project_id: Some("test-project".into()),
        ..NetworkResolverConfig::default()
    };
    let resolver = NetworkDidResolver::new(config, Arc::new(DefaultDocumentRegistry));

    let document = resolver.resolve(&keystore.did).await.expect("resolve");
    assert_eq!(document.id, keystore.did.to_string());
    let key = PublicKey::from_hex(&keystore.pub_key).expect("public key");
    assert!(document.authorizes(&key));
}
