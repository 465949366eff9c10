use async_trait::async_trait;
use dashmap::DashMap;
use vouch_core::{CareerType, ClaimStatus, Did};

use crate::error::LifecycleError;
use crate::records::{Claim, Resume};

/// Selection over stored claims. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimFilter {
    pub owner: Option<Did>,
    pub issuer: Option<Did>,
    pub career_type: Option<CareerType>,
    pub status: Option<ClaimStatus>,
}

impl ClaimFilter {
    pub fn by_owner(owner: Did) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn by_issuer(issuer: Did) -> Self {
        Self {
            issuer: Some(issuer),
            ..Self::default()
        }
    }

    pub fn with_career_type(mut self, career_type: Option<CareerType>) -> Self {
        self.career_type = career_type;
        self
    }

    pub fn matches(&self, claim: &Claim) -> bool {
        self.owner.as_ref().map_or(true, |d| *d == claim.owner)
            && self.issuer.as_ref().map_or(true, |d| *d == claim.issuer)
            && self.career_type.map_or(true, |t| t == claim.career_type)
            && self.status.map_or(true, |s| s == claim.status)
    }
}

/// Selection over stored resumes. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeFilter {
    pub owner: Option<Did>,
    pub verifier: Option<Did>,
    pub position_id: Option<i64>,
}

impl ResumeFilter {
    pub fn matches(&self, resume: &Resume) -> bool {
        self.owner.as_ref().map_or(true, |d| *d == resume.owner)
            && self.verifier.as_ref().map_or(true, |d| *d == resume.verifier)
            && self.position_id.map_or(true, |p| p == resume.position_id)
    }
}

/// Claim persistence.
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    async fn insert(&self, claim: Claim) -> Result<(), LifecycleError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Claim>, LifecycleError>;

    /// Matching claims, oldest first.
    async fn find(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, LifecycleError>;

    /// Atomically move a PENDING ENC_VC claim to `status` and store `career`.
    ///
    /// Returns the updated claim, or `None` when the claim is missing or was
    /// no longer pending. At most one concurrent caller wins.
    async fn resolve_pending(
        &self,
        id: &str,
        status: ClaimStatus,
        career: String,
    ) -> Result<Option<Claim>, LifecycleError>;
}

/// Resume persistence.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn insert(&self, resume: Resume) -> Result<(), LifecycleError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Resume>, LifecycleError>;

    /// Matching resumes, oldest first.
    async fn find(&self, filter: &ResumeFilter) -> Result<Vec<Resume>, LifecycleError>;
}

/// Apply a pending resolution in place. False if the claim is not a
/// PENDING ENC_VC claim.
pub fn apply_resolution(claim: &mut Claim, status: ClaimStatus, career: String) -> bool {
    if claim.status != ClaimStatus::Pending || claim.career_type != CareerType::EncVc {
        return false;
    }
    claim.status = status;
    claim.career = career;
    true
}

/// In-process claim store. Ids are time-ordered, so sorting by id gives
/// insertion order.
#[derive(Default)]
pub struct InMemoryClaimRepository {
    claims: DashMap<String, Claim>,
}

impl InMemoryClaimRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn insert(&self, claim: Claim) -> Result<(), LifecycleError> {
        if self.claims.contains_key(&claim.id) {
            return Err(LifecycleError::Storage(format!("duplicate claim id {}", claim.id)));
        }
        tracing::debug!(claim_id = %claim.id, "claim stored");
        self.claims.insert(claim.id.clone(), claim);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Claim>, LifecycleError> {
        Ok(self.claims.get(id).map(|e| e.value().clone()))
    }

    async fn find(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, LifecycleError> {
        let mut found: Vec<Claim> = self
            .claims
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn resolve_pending(
        &self,
        id: &str,
        status: ClaimStatus,
        career: String,
    ) -> Result<Option<Claim>, LifecycleError> {
        // The shard write lock is held for the whole check-and-set.
        let Some(mut entry) = self.claims.get_mut(id) else {
            return Ok(None);
        };
        if !apply_resolution(entry.value_mut(), status, career) {
            return Ok(None);
        }
        Ok(Some(entry.value().clone()))
    }
}

/// In-process resume store.
#[derive(Default)]
pub struct InMemoryResumeRepository {
    resumes: DashMap<String, Resume>,
}

impl InMemoryResumeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeRepository for InMemoryResumeRepository {
    async fn insert(&self, resume: Resume) -> Result<(), LifecycleError> {
        if self.resumes.contains_key(&resume.id) {
            return Err(LifecycleError::Storage(format!("duplicate resume id {}", resume.id)));
        }
        tracing::debug!(resume_id = %resume.id, "resume stored");
        self.resumes.insert(resume.id.clone(), resume);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Resume>, LifecycleError> {
        Ok(self.resumes.get(id).map(|e| e.value().clone()))
    }

    async fn find(&self, filter: &ResumeFilter) -> Result<Vec<Resume>, LifecycleError> {
        let mut found: Vec<Resume> = self
            .resumes
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }
}
