//! Integration tests for resume submission and reading.
//!
//! Tests cover:
//! 1. The full path from a claim request to a verified resume career
//! 2. Presentation assembly from sealed credentials
//! 3. Content-store references, reachable or not
//! 4. Caller and payload checks on submission
//! 5. Listing per role

use vouch_core::{CareerType, ClaimContent, ErrorKind};
use vouch_integration_tests::{
    engineer, World, EMPLOYEE_TOKEN, EMPLOYER_TOKEN, KNOWN_HASH, SECOND_EMPLOYEE_TOKEN,
};
use vouch_lifecycle::{decrypt_career, CareerEntry, CareerProof, ClaimDecision, NewResume};

// ============================================================================
// Helper functions
// ============================================================================

fn entry(career_type: CareerType, content: impl Into<String>) -> CareerEntry {
    CareerEntry {
        career_type,
        content: content.into(),
    }
}

fn application(world: &World, careers: Vec<CareerEntry>) -> NewResume {
    NewResume {
        verifier: world.employer.did.clone(),
        title: "Platform engineer application".into(),
        position_id: 42,
        cover_letter_ids: vec![7],
        careers,
    }
}

/// Run a claim through acceptance and open the sealed credential.
async fn accepted_credential(world: &World, content: ClaimContent) -> String {
    let claim = world
        .claims
        .create_claim(EMPLOYEE_TOKEN, &world.employer.did, "Career", content)
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
        .expect("accept claim");
    decrypt_career(&accepted.career, &world.employee.priv_key).expect("open career")
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_claim_to_verified_resume() {
    let world = World::new();
    let first = accepted_credential(&world, engineer()).await;
    let second = accepted_credential(
        &world,
        ClaimContent::new("2021-07", "2023-02", "Initech", "Staff Engineer"),
    )
    .await;

    let resume = world
        .resumes
        .create_resume(
            EMPLOYEE_TOKEN,
            &world.employee,
            application(
                &world,
                vec![
                    entry(CareerType::EncVc, first.clone()),
                    entry(CareerType::IpfsHash, KNOWN_HASH),
                    entry(CareerType::EncVc, second.clone()),
                ],
            ),
        )
        .await
        .expect("submit resume");
    assert!(!resume.careers.vp.is_empty());
    assert_eq!(resume.careers.smart_careers, vec![KNOWN_HASH.to_string()]);

    let presented = world
        .verifier
        .verify_vp(&resume.careers.vp)
        .await
        .expect("verify VP");
    assert_eq!(presented.credential_jwts, vec![first.clone(), second.clone()]);

    let detail = world
        .resumes
        .get_resume(EMPLOYER_TOKEN, &resume.id)
        .await
        .expect("verifier reads resume");
    assert_eq!(detail.position_id, 42);
    assert_eq!(detail.careers.len(), 3);
    assert!(detail.careers.iter().all(|c| c.is_verified));
    assert_eq!(detail.careers[0].verify, CareerProof::Jwt { jwt: first });
    assert_eq!(detail.careers[1].verify, CareerProof::Jwt { jwt: second });
    assert_eq!(detail.careers[0].content, Some(engineer()));
    assert_eq!(
        detail.careers[2].verify,
        CareerProof::IpfsHash {
            hash: KNOWN_HASH.into()
        }
    );
    assert_eq!(
        detail.careers[2].content.as_ref().map(|c| c.workplace.as_str()),
        Some("Globex")
    );
}

// ============================================================================
// Presentation assembly
// ============================================================================

#[tokio::test]
async fn test_resume_without_credentials_has_empty_vp() {
    let world = World::new();
    let resume = world
        .resumes
        .create_resume(
            EMPLOYEE_TOKEN,
            &world.employee,
            application(&world, vec![entry(CareerType::IpfsHash, KNOWN_HASH)]),
        )
        .await
        .expect("submit resume");
    assert_eq!(resume.careers.vp, "");

    let detail = world
        .resumes
        .get_resume(EMPLOYEE_TOKEN, &resume.id)
        .await
        .expect("owner reads resume");
    assert_eq!(detail.careers.len(), 1);
    assert!(detail.careers[0].is_verified);
}

#[tokio::test]
async fn test_unreachable_reference_marked_unverified() {
    let world = World::new();
    let resume = world
        .resumes
        .create_resume(
            EMPLOYEE_TOKEN,
            &world.employee,
            application(
                &world,
                vec![
                    entry(CareerType::IpfsHash, KNOWN_HASH),
                    entry(CareerType::IpfsHash, "QmGoneMissing"),
                    entry(CareerType::IpfsHash, KNOWN_HASH),
                ],
            ),
        )
        .await
        .expect("submit resume");

    let detail = world
        .resumes
        .get_resume(EMPLOYER_TOKEN, &resume.id)
        .await
        .expect("read succeeds despite a missing reference");
    let verified: Vec<bool> = detail.careers.iter().map(|c| c.is_verified).collect();
    assert_eq!(verified, vec![true, false, true]);
    assert_eq!(
        detail.careers[1].verify,
        CareerProof::IpfsHash {
            hash: "QmGoneMissing".into()
        }
    );
    assert!(detail.careers[1].content.is_none());
}

// ============================================================================
// Submission checks
// ============================================================================

#[tokio::test]
async fn test_submission_faults_are_distinct() {
    let world = World::new();

    let err = world
        .resumes
        .create_resume(EMPLOYER_TOKEN, &world.employer, application(&world, vec![]))
        .await
        .expect_err("employers do not submit resumes");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = world
        .resumes
        .create_resume(EMPLOYEE_TOKEN, &world.second_employee, application(&world, vec![]))
        .await
        .expect_err("keystore of another user");
    assert_eq!(err.kind(), ErrorKind::ClientFault);

    let mut to_peer = application(&world, vec![]);
    to_peer.verifier = world.second_employee.did.clone();
    let err = world
        .resumes
        .create_resume(EMPLOYEE_TOKEN, &world.employee, to_peer)
        .await
        .expect_err("verifier must be an employer");
    assert_eq!(err.kind(), ErrorKind::ClientFault);

    let err = world
        .resumes
        .create_resume(
            EMPLOYEE_TOKEN,
            &world.employee,
            application(&world, vec![entry(CareerType::EncVc, "not-a-token")]),
        )
        .await
        .expect_err("sealed entries must be credentials");
    assert_eq!(err.kind(), ErrorKind::ClientFault);
}

// ============================================================================
// Listing and access
// ============================================================================

#[tokio::test]
async fn test_resume_listing_per_role() {
    let world = World::new();
    let resume = world
        .resumes
        .create_resume(
            EMPLOYEE_TOKEN,
            &world.employee,
            application(&world, vec![entry(CareerType::IpfsHash, KNOWN_HASH)]),
        )
        .await
        .expect("submit resume");

    let for_position = world
        .resumes
        .list_resumes(EMPLOYER_TOKEN, Some(42))
        .await
        .expect("verifier lists by position");
    assert_eq!(for_position.len(), 1);
    assert_eq!(for_position[0].id, resume.id);
    assert_eq!(for_position[0].holder, world.employee.did);

    let other_position = world
        .resumes
        .list_resumes(EMPLOYER_TOKEN, Some(7))
        .await
        .expect("verifier lists other position");
    assert!(other_position.is_empty());

    let own = world
        .resumes
        .list_resumes(EMPLOYEE_TOKEN, None)
        .await
        .expect("owner lists");
    assert_eq!(own.len(), 1);

    let err = world
        .resumes
        .list_resumes(EMPLOYEE_TOKEN, Some(42))
        .await
        .expect_err("position filter is for verifiers");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = world
        .resumes
        .get_resume(SECOND_EMPLOYEE_TOKEN, &resume.id)
        .await
        .expect_err("stranger cannot read");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}
