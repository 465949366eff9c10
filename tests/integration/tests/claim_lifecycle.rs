//! Integration tests for the claim lifecycle.
//!
//! Tests cover:
//! 1. Role checks on claim creation
//! 2. Pending → Accepted with a sealed credential the holder can open
//! 3. Pending → Rejected and terminal states
//! 4. Career claims created from content-store references
//! 5. Read access and listing per role

use vouch_core::{CareerType, ClaimContent, ClaimStatus, ErrorKind};
use vouch_credentials::decode_credential;
use vouch_integration_tests::{
    engineer, World, EMPLOYEE_TOKEN, EMPLOYER_TOKEN, KNOWN_HASH, SECOND_EMPLOYEE_TOKEN,
};
use vouch_lifecycle::{decrypt_career, ClaimDecision};

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_fresh_claim_is_pending() {
    let world = World::new();
    let claim = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.employer.did, "Backend role", engineer())
        .await
        .expect("create claim");

    assert_eq!(claim.status, ClaimStatus::Pending);
    assert_eq!(claim.career_type, CareerType::EncVc);
    assert!(claim.career.is_empty());
    assert_eq!(claim.owner, world.employee.did);
    assert_eq!(claim.issuer, world.employer.did);
}

#[tokio::test]
async fn test_claim_roles_enforced() {
    let world = World::new();

    let err = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.second_employee.did, "Peer", engineer())
        .await
        .expect_err("issuer must be an employer");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = world
        .claims
        .create_claim(EMPLOYER_TOKEN, &world.employer.did, "Self", engineer())
        .await
        .expect_err("employers cannot request claims");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_unknown_session_rejected() {
    let world = World::new();
    let result = world
        .claims
        .create_claim("no-such-session", &world.employer.did, "Ghost", engineer())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_career_claim_born_accepted() {
    let world = World::new();
    let claim = world
        .claims
        .create_career_claim(
            EMPLOYEE_TOKEN,
            &world.employee.did,
            &world.employer.did,
            "Analyst years",
            KNOWN_HASH,
        )
        .await
        .expect("create career claim");

    assert_eq!(claim.status, ClaimStatus::Accepted);
    assert_eq!(claim.career_type, CareerType::IpfsHash);
    assert_eq!(claim.career, KNOWN_HASH);
    assert_eq!(claim.content.workplace, "Globex");

    // Already final: no issuer decision applies.
    let err = world
        .claims
        .update_claim_status(EMPLOYER_TOKEN, &claim.id, ClaimDecision::Reject)
        .await
        .expect_err("career claims never move");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_career_claim_unknown_hash() {
    let world = World::new();
    let err = world
        .claims
        .create_career_claim(
            EMPLOYEE_TOKEN,
            &world.employee.did,
            &world.employer.did,
            "Missing",
            "QmNothingHere",
        )
        .await
        .expect_err("hash is not in the store");
    assert_eq!(err.kind(), ErrorKind::MicroserviceError);
}

// ============================================================================
// Issuer decisions
// ============================================================================

#[tokio::test]
async fn test_accept_seals_credential_for_holder() {
    let world = World::new();
    let content = engineer();
    let claim = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.employer.did, "Backend role", content.clone())
        .await
        .expect("create claim");

    let accepted = world
        .claims
        .update_claim_status(
            EMPLOYER_TOKEN,
            &claim.id,
            ClaimDecision::Accept(world.employer.clone()),
        )
        .await
        .expect("accept");
    assert_eq!(accepted.status, ClaimStatus::Accepted);
    assert!(!accepted.career.is_empty());

    let token = decrypt_career(&accepted.career, &world.employee.priv_key).expect("open career");
    let verified = world.verifier.verify_vc(&token).await.expect("verify VC");
    assert_eq!(verified.subject, world.employee.did);
    assert_eq!(verified.issuer, world.employer.did);
    let subject: ClaimContent = decode_credential(&token)
        .expect("decode")
        .subject_as()
        .expect("subject");
    assert_eq!(subject, content);

    // The employer cannot open what was sealed for the holder.
    assert!(decrypt_career(&accepted.career, &world.employer.priv_key).is_err());

    let err = world
        .claims
        .update_claim_status(EMPLOYER_TOKEN, &claim.id, ClaimDecision::Reject)
        .await
        .expect_err("terminal claim");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_reject_leaves_career_empty() {
    let world = World::new();
    let claim = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.employer.did, "Backend role", engineer())
        .await
        .expect("create claim");

    let rejected = world
        .claims
        .update_claim_status(EMPLOYER_TOKEN, &claim.id, ClaimDecision::Reject)
        .await
        .expect("reject");
    assert_eq!(rejected.status, ClaimStatus::Rejected);
    assert!(rejected.career.is_empty());

    let err = world
        .claims
        .update_claim_status(
            EMPLOYER_TOKEN,
            &claim.id,
            ClaimDecision::Accept(world.employer.clone()),
        )
        .await
        .expect_err("terminal claim");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_accept_with_foreign_keystore_denied() {
    let world = World::new();
    let claim = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.employer.did, "Backend role", engineer())
        .await
        .expect("create claim");

    let err = world
        .claims
        .update_claim_status(
            EMPLOYER_TOKEN,
            &claim.id,
            ClaimDecision::Accept(world.employee.clone()),
        )
        .await
        .expect_err("keystore belongs to someone else");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let detail = world
        .claims
        .get_claim(EMPLOYEE_TOKEN, &claim.id)
        .await
        .expect("read claim");
    assert_eq!(detail.status, ClaimStatus::Pending);
}

#[tokio::test]
async fn test_concurrent_decisions_single_winner() {
    let world = World::new();
    let claim = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.employer.did, "Backend role", engineer())
        .await
        .expect("create claim");

    let (accept, reject) = tokio::join!(
        world.claims.update_claim_status(
            EMPLOYER_TOKEN,
            &claim.id,
            ClaimDecision::Accept(world.employer.clone()),
        ),
        world
            .claims
            .update_claim_status(EMPLOYER_TOKEN, &claim.id, ClaimDecision::Reject),
    );
    assert_eq!(
        [accept.is_ok(), reject.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );

    let loser = accept.err().or(reject.err()).expect("one decision loses");
    assert_eq!(loser.kind(), ErrorKind::NotFound);
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_claim_visibility_per_role() {
    let world = World::new();
    let claim = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.employer.did, "Backend role", engineer())
        .await
        .expect("create claim");
    world
        .claims
        .create_career_claim(
            EMPLOYEE_TOKEN,
            &world.employee.did,
            &world.employer.did,
            "Analyst years",
            KNOWN_HASH,
        )
        .await
        .expect("create career claim");

    let owned = world
        .claims
        .list_claims(EMPLOYEE_TOKEN, None)
        .await
        .expect("list own");
    assert_eq!(owned.len(), 2);

    let sealed_only = world
        .claims
        .list_claims(EMPLOYER_TOKEN, Some(CareerType::EncVc))
        .await
        .expect("list issued");
    assert_eq!(sealed_only.len(), 1);
    assert_eq!(sealed_only[0].id, claim.id);
    assert_eq!(sealed_only[0].holder, world.employee.did);

    let others = world
        .claims
        .list_claims(SECOND_EMPLOYEE_TOKEN, None)
        .await
        .expect("list other");
    assert!(others.is_empty());

    let detail = world
        .claims
        .get_claim(EMPLOYER_TOKEN, &claim.id)
        .await
        .expect("issuer reads claim");
    assert_eq!(detail.claim, engineer());

    let err = world
        .claims
        .get_claim(SECOND_EMPLOYEE_TOKEN, &claim.id)
        .await
        .expect_err("stranger cannot read");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = world
        .claims
        .get_claim(EMPLOYEE_TOKEN, "missing")
        .await
        .expect_err("unknown id");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
