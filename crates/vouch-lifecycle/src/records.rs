//! Persisted records and their caller-facing projections.

use serde::{Deserialize, Serialize};
use vouch_core::{CareerType, ClaimContent, ClaimStatus, Did};

/// An employment claim. Field names and integer encodings are the stored
/// document format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: Did,
    pub issuer: Did,
    pub title: String,
    pub content: ClaimContent,
    pub status: ClaimStatus,
    pub career_type: CareerType,
    /// Base64 sealed VC once accepted (ENC_VC), or the content hash (IPFS_HASH).
    #[serde(default)]
    pub career: String,
}

impl Claim {
    pub fn summary(&self) -> ClaimSummary {
        ClaimSummary {
            id: self.id.clone(),
            holder: self.owner.clone(),
            issuer: self.issuer.clone(),
            title: self.title.clone(),
            status: self.status,
        }
    }

    pub fn detail(&self) -> ClaimDetail {
        ClaimDetail {
            id: self.id.clone(),
            holder: self.owner.clone(),
            issuer: self.issuer.clone(),
            title: self.title.clone(),
            claim: self.content.clone(),
            status: self.status,
            career_type: self.career_type,
            career: self.career.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub id: String,
    pub holder: Did,
    pub issuer: Did,
    pub title: String,
    pub status: ClaimStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDetail {
    pub id: String,
    pub holder: Did,
    pub issuer: Did,
    pub title: String,
    pub claim: ClaimContent,
    pub status: ClaimStatus,
    pub career_type: CareerType,
    pub career: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCareers {
    /// Holder-signed presentation over every ENC_VC entry, or empty.
    #[serde(default)]
    pub vp: String,
    #[serde(default)]
    pub smart_careers: Vec<String>,
}

/// A resume submitted to a verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: Did,
    pub verifier: Did,
    pub title: String,
    pub position_id: i64,
    #[serde(default)]
    pub cover_letter_ids: Vec<i64>,
    pub careers: ResumeCareers,
}

impl Resume {
    pub fn summary(&self) -> ResumeSummary {
        ResumeSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            holder: self.owner.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub id: String,
    pub title: String,
    pub holder: Did,
    pub verifier: Did,
}

/// One career item of a resume submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerEntry {
    pub career_type: CareerType,
    /// A VC token for ENC_VC, a content hash for IPFS_HASH.
    pub content: String,
}

/// Everything a holder submits to create a resume, besides the keystore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResume {
    pub verifier: Did,
    pub title: String,
    pub position_id: i64,
    #[serde(default)]
    pub cover_letter_ids: Vec<i64>,
    #[serde(default)]
    pub careers: Vec<CareerEntry>,
}

/// How a projected career was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CareerProof {
    #[serde(rename = "JwtProof2020")]
    Jwt { jwt: String },
    #[serde(rename = "IPFS_HASH")]
    IpfsHash { hash: String },
}

/// A career as shown to a resume reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerProjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ClaimContent>,
    pub verify: CareerProof,
    pub is_verified: bool,
}

impl CareerProjection {
    /// A hash reference whose content could not be fetched.
    pub fn unverified_hash(hash: impl Into<String>) -> Self {
        Self {
            holder: None,
            issuer: None,
            content: None,
            verify: CareerProof::IpfsHash { hash: hash.into() },
            is_verified: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDetail {
    pub id: String,
    pub owner: Did,
    pub verifier: Did,
    pub title: String,
    pub position_id: i64,
    #[serde(rename = "coverLetterId")]
    pub cover_letter_ids: Vec<i64>,
    pub careers: Vec<CareerProjection>,
}

/// A career document held by the content-addressed store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartCareer {
    #[serde(default)]
    pub holder: String,
    #[serde(default)]
    pub issuer: String,
    pub content: ClaimContent,
}
