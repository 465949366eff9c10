use std::sync::Arc;

use futures::future::join_all;
use vouch_core::{CareerType, ClaimContent, Keystore};
use vouch_credentials::{decode_credential, CredentialHolder, CredentialVerifier, W3cCredential};
use vouch_identity::IdentityLookup;

use crate::content_store::ContentStore;
use crate::error::LifecycleError;
use crate::records::{
    CareerProjection, CareerProof, NewResume, Resume, ResumeCareers, ResumeDetail, ResumeSummary,
};
use crate::repository::{ResumeFilter, ResumeRepository};

/// Bundles a holder's careers for a verifier and verifies them on read.
pub struct ResumeAggregator {
    directory: Arc<dyn IdentityLookup>,
    resumes: Arc<dyn ResumeRepository>,
    content: Arc<dyn ContentStore>,
    verifier: Arc<CredentialVerifier>,
    holder: CredentialHolder,
}

impl ResumeAggregator {
    pub fn new(
        directory: Arc<dyn IdentityLookup>,
        resumes: Arc<dyn ResumeRepository>,
        content: Arc<dyn ContentStore>,
        verifier: Arc<CredentialVerifier>,
    ) -> Self {
        Self {
            directory,
            resumes,
            content,
            verifier,
            holder: CredentialHolder::new(),
        }
    }

    /// Submit a resume. ENC_VC entries are wrapped, in order, in one
    /// holder-signed VP. IPFS_HASH entries are kept as references.
    pub async fn create_resume(
        &self,
        token: &str,
        keystore: &Keystore,
        request: NewResume,
    ) -> Result<Resume, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        if !caller.is_employee() {
            return Err(LifecycleError::PermissionDenied(
                "only employees can submit resumes".into(),
            ));
        }
        if keystore.did != caller.did {
            return Err(LifecycleError::ClientFault(
                "keystore does not belong to the caller".into(),
            ));
        }
        let verifier = self.directory.resolve_by_did(token, &request.verifier).await?;
        if !verifier.is_employer() {
            return Err(LifecycleError::ClientFault(format!(
                "{} is not an employer",
                verifier.did
            )));
        }

        let mut vc_tokens = Vec::new();
        let mut smart_careers = Vec::new();
        for entry in request.careers {
            match entry.career_type {
                CareerType::EncVc => {
                    decode_credential(&entry.content).map_err(|e| {
                        LifecycleError::ClientFault(format!("career is not a credential: {}", e))
                    })?;
                    vc_tokens.push(entry.content);
                }
                CareerType::IpfsHash => smart_careers.push(entry.content),
            }
        }

        let vp = if vc_tokens.is_empty() {
            String::new()
        } else {
            self.holder
                .create_vp(&caller.did, &keystore.priv_key, &vc_tokens)?
        };

        let resume = Resume {
            id: uuid::Uuid::now_v7().simple().to_string(),
            owner: caller.did,
            verifier: verifier.did,
            title: request.title,
            position_id: request.position_id,
            cover_letter_ids: request.cover_letter_ids,
            careers: ResumeCareers { vp, smart_careers },
        };
        self.resumes.insert(resume.clone()).await?;

        tracing::info!(
            resume_id = %resume.id,
            owner = %resume.owner,
            verifier = %resume.verifier,
            credentials = vc_tokens.len(),
            references = resume.careers.smart_careers.len(),
            "resume submitted"
        );
        Ok(resume)
    }

    /// Employers see resumes addressed to them, optionally for one position.
    /// Employees see their own and may not filter by position.
    pub async fn list_resumes(
        &self,
        token: &str,
        position_id: Option<i64>,
    ) -> Result<Vec<ResumeSummary>, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        let filter = if caller.is_employer() {
            ResumeFilter {
                verifier: Some(caller.did),
                position_id,
                ..ResumeFilter::default()
            }
        } else {
            if position_id.is_some() {
                return Err(LifecycleError::PermissionDenied(
                    "position filter is for verifiers".into(),
                ));
            }
            ResumeFilter {
                owner: Some(caller.did),
                ..ResumeFilter::default()
            }
        };
        let resumes = self.resumes.find(&filter).await?;
        Ok(resumes.iter().map(Resume::summary).collect())
    }

    /// Load a resume and project its careers. The VP must verify; fetched
    /// hash references count as verified, unfetchable ones do not.
    pub async fn get_resume(&self, token: &str, id: &str) -> Result<ResumeDetail, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        let resume = self
            .resumes
            .find_by_id(id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("resume {}", id)))?;
        let allowed = (caller.is_employer() && resume.verifier == caller.did)
            || (caller.is_employee() && resume.owner == caller.did);
        if !allowed {
            return Err(LifecycleError::PermissionDenied(format!(
                "resume {} is not addressed to the caller",
                id
            )));
        }

        let mut careers = Vec::new();
        if !resume.careers.vp.is_empty() {
            let verified = self.verifier.verify_vp(&resume.careers.vp).await?;
            careers.extend(
                verified
                    .verifiable_presentation
                    .verifiable_credential
                    .iter()
                    .map(credential_projection),
            );
        }

        let fetched = join_all(
            resume
                .careers
                .smart_careers
                .iter()
                .map(|hash| self.content.fetch(hash)),
        )
        .await;
        for (hash, result) in resume.careers.smart_careers.iter().zip(fetched) {
            careers.push(match result {
                Ok(career) => CareerProjection {
                    holder: Some(career.holder),
                    issuer: Some(career.issuer),
                    content: Some(career.content),
                    verify: CareerProof::IpfsHash { hash: hash.clone() },
                    is_verified: true,
                },
                Err(e) => {
                    tracing::warn!(resume_id = %resume.id, hash = %hash, error = %e, "career reference unavailable");
                    CareerProjection::unverified_hash(hash.clone())
                }
            });
        }

        Ok(ResumeDetail {
            id: resume.id,
            owner: resume.owner,
            verifier: resume.verifier,
            title: resume.title,
            position_id: resume.position_id,
            cover_letter_ids: resume.cover_letter_ids,
            careers,
        })
    }
}

fn credential_projection(vc: &W3cCredential) -> CareerProjection {
    CareerProjection {
        holder: vc.holder().map(str::to_string),
        issuer: Some(vc.issuer.id.clone()),
        content: vc.subject_as::<ClaimContent>().ok(),
        verify: CareerProof::Jwt {
            jwt: vc.proof.jwt.clone(),
        },
        is_verified: true,
    }
}
