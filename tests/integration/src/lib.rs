//! Shared fixtures for the cross-crate scenarios: a directory with one
//! employer and one employee session, local DID resolution, and in-memory
//! repositories and content store.

use std::sync::Arc;

use vouch_core::{ClaimContent, CredentialConfig, Keystore, Role};
use vouch_credentials::{CredentialIssuer, CredentialVerifier};
use vouch_identity::{generate_keystore, Identity, LocalDidResolver, StaticDirectory};
use vouch_lifecycle::{
    ClaimManager, InMemoryClaimRepository, InMemoryContentStore, InMemoryResumeRepository,
    ResumeAggregator, SmartCareer,
};

pub const EMPLOYER_TOKEN: &str = "employer-session";
pub const EMPLOYEE_TOKEN: &str = "employee-session";
pub const SECOND_EMPLOYEE_TOKEN: &str = "second-employee-session";
pub const KNOWN_HASH: &str = "QmKnownCareer";

pub struct World {
    pub employer: Keystore,
    pub employee: Keystore,
    pub second_employee: Keystore,
    pub directory: Arc<StaticDirectory>,
    pub content: Arc<InMemoryContentStore>,
    pub resolver: Arc<LocalDidResolver>,
    pub verifier: Arc<CredentialVerifier>,
    pub claims: ClaimManager,
    pub resumes: ResumeAggregator,
}

impl World {
    pub fn new() -> Self {
        let employer = generate_keystore("ropsten").expect("employer keystore");
        let employee = generate_keystore("ropsten").expect("employee keystore");
        let second_employee = generate_keystore("ropsten").expect("second employee keystore");

        let directory = Arc::new(StaticDirectory::new());
        directory.add_session(EMPLOYER_TOKEN, Identity::new(employer.did.clone(), Role::Employer));
        directory.add_session(EMPLOYEE_TOKEN, Identity::new(employee.did.clone(), Role::Employee));
        directory.add_session(
            SECOND_EMPLOYEE_TOKEN,
            Identity::new(second_employee.did.clone(), Role::Employee),
        );

        let content = Arc::new(InMemoryContentStore::new());
        content.put(
            KNOWN_HASH,
            SmartCareer {
                holder: employee.did.to_string(),
                issuer: employer.did.to_string(),
                content: ClaimContent::new("2015-03", "2017-11", "Globex", "Analyst"),
            },
        );

        let config = CredentialConfig::default();
        let resolver = Arc::new(LocalDidResolver::new());
        let verifier = Arc::new(CredentialVerifier::new(resolver.clone(), &config));
        let claims = ClaimManager::new(
            directory.clone(),
            Arc::new(InMemoryClaimRepository::new()),
            content.clone(),
            resolver.clone(),
            CredentialIssuer::new(config),
        );
        let resumes = ResumeAggregator::new(
            directory.clone(),
            Arc::new(InMemoryResumeRepository::new()),
            content.clone(),
            verifier.clone(),
        );

        Self {
            employer,
            employee,
            second_employee,
            directory,
            content,
            resolver,
            verifier,
            claims,
            resumes,
        }
    }

    /// Issue a VC from the employer to the employee outside the claim flow.
    pub fn issue_direct(&self, content: &ClaimContent) -> String {
        CredentialIssuer::default()
            .create_vc(&self.employee.did, content, &self.employer.did, &self.employer.priv_key)
            .expect("issue VC")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

pub fn engineer() -> ClaimContent {
    ClaimContent::new("2019-01", "2021-06", "Acme Corp", "Backend Engineer")
}
