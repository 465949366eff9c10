//! Vouch Lifecycle: employment claims from request to sealed credential,
//! and resumes that bundle them for a verifier.

pub mod claims;
pub mod content_store;
pub mod error;
pub mod records;
pub mod repository;
pub mod resumes;

pub use claims::{decrypt_career, ClaimDecision, ClaimManager};
pub use content_store::{ContentStore, HttpContentStore, InMemoryContentStore};
pub use error::LifecycleError;
pub use records::{
    CareerEntry, CareerProjection, CareerProof, Claim, ClaimDetail, ClaimSummary, NewResume,
    Resume, ResumeCareers, ResumeDetail, ResumeSummary, SmartCareer,
};
pub use repository::{
    apply_resolution, ClaimFilter, ClaimRepository, InMemoryClaimRepository, InMemoryResumeRepository,
    ResumeFilter, ResumeRepository,
};
pub use resumes::ResumeAggregator;
