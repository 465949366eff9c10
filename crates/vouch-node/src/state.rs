//! Shared service state, accessible from HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use vouch_core::CredentialConfig;
use vouch_credentials::{CredentialHolder, CredentialIssuer, CredentialVerifier};
use vouch_identity::{DidResolver, IdentityLookup};
use vouch_lifecycle::{ClaimManager, ClaimRepository, ContentStore, ResumeAggregator, ResumeRepository};

/// Collaborators a running service is wired from.
pub struct Backends {
    pub directory: Arc<dyn IdentityLookup>,
    pub resolver: Arc<dyn DidResolver>,
    pub claims: Arc<dyn ClaimRepository>,
    pub resumes: Arc<dyn ResumeRepository>,
    pub content: Arc<dyn ContentStore>,
}

pub struct AppState {
    /// When the service started.
    pub start_time: Instant,
    /// Network used for `GET /ssi/did`.
    pub default_chain: String,
    pub resolver: Arc<dyn DidResolver>,
    pub issuer: CredentialIssuer,
    pub holder: CredentialHolder,
    pub verifier: Arc<CredentialVerifier>,
    pub claims: ClaimManager,
    pub resumes: ResumeAggregator,
}

impl AppState {
    pub fn new(credentials: &CredentialConfig, backends: Backends) -> Self {
        let issuer = CredentialIssuer::new(credentials.clone());
        let verifier = Arc::new(CredentialVerifier::new(
            backends.resolver.clone(),
            credentials,
        ));
        let claims = ClaimManager::new(
            backends.directory.clone(),
            backends.claims,
            backends.content.clone(),
            backends.resolver.clone(),
            issuer.clone(),
        );
        let resumes = ResumeAggregator::new(
            backends.directory,
            backends.resumes,
            backends.content,
            verifier.clone(),
        );
        Self {
            start_time: Instant::now(),
            default_chain: credentials.default_chain.clone(),
            resolver: backends.resolver,
            issuer,
            holder: CredentialHolder::new(),
            verifier,
            claims,
            resumes,
        }
    }
}
