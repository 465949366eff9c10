use std::sync::Arc;

use vouch_core::{CareerType, ClaimContent, ClaimEvent, ClaimStateMachine, Did, Keystore};
use vouch_credentials::CredentialIssuer;
use vouch_crypto::{decrypt_base64, encrypt_base64, KeyPair, PublicKey};
use vouch_identity::{DidResolver, Identity, IdentityLookup};

use crate::content_store::ContentStore;
use crate::error::LifecycleError;
use crate::records::{Claim, ClaimDetail, ClaimSummary};
use crate::repository::{ClaimFilter, ClaimRepository};

/// An issuer's answer to a pending claim.
#[derive(Debug, Clone)]
pub enum ClaimDecision {
    /// Sign with the issuer's keystore, which must belong to the caller.
    Accept(Keystore),
    Reject,
}

impl ClaimDecision {
    fn event(&self) -> ClaimEvent {
        match self {
            Self::Accept(_) => ClaimEvent::Accept,
            Self::Reject => ClaimEvent::Reject,
        }
    }
}

/// Drives employment claims from request to sealed credential.
pub struct ClaimManager {
    directory: Arc<dyn IdentityLookup>,
    claims: Arc<dyn ClaimRepository>,
    content: Arc<dyn ContentStore>,
    resolver: Arc<dyn DidResolver>,
    issuer: CredentialIssuer,
}

impl ClaimManager {
    pub fn new(
        directory: Arc<dyn IdentityLookup>,
        claims: Arc<dyn ClaimRepository>,
        content: Arc<dyn ContentStore>,
        resolver: Arc<dyn DidResolver>,
        issuer: CredentialIssuer,
    ) -> Self {
        Self {
            directory,
            claims,
            content,
            resolver,
            issuer,
        }
    }

    fn new_id() -> String {
        uuid::Uuid::now_v7().simple().to_string()
    }

    /// An employee asks `issuer` to attest `content`. The claim starts PENDING.
    pub async fn create_claim(
        &self,
        token: &str,
        issuer: &Did,
        title: impl Into<String>,
        content: ClaimContent,
    ) -> Result<Claim, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        if !caller.is_employee() {
            return Err(LifecycleError::PermissionDenied(
                "only employees can request claims".into(),
            ));
        }
        let issuer = self.directory.resolve_by_did(token, issuer).await?;
        if !issuer.is_employer() {
            return Err(LifecycleError::PermissionDenied(format!(
                "{} is not an employer",
                issuer.did
            )));
        }

        let claim = Claim {
            id: Self::new_id(),
            owner: caller.did,
            issuer: issuer.did,
            title: title.into(),
            content,
            status: ClaimStateMachine::initial(CareerType::EncVc),
            career_type: CareerType::EncVc,
            career: String::new(),
        };
        self.claims.insert(claim.clone()).await?;

        tracing::info!(
            claim_id = %claim.id,
            owner = %claim.owner,
            issuer = %claim.issuer,
            "claim requested"
        );
        Ok(claim)
    }

    /// Record a career already attested in the content store. The caller
    /// must be the named owner or the named issuer. The claim is ACCEPTED
    /// from the start.
    pub async fn create_career_claim(
        &self,
        token: &str,
        owner: &Did,
        issuer: &Did,
        title: impl Into<String>,
        content_hash: &str,
    ) -> Result<Claim, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        if caller.did != *owner && caller.did != *issuer {
            return Err(LifecycleError::PermissionDenied(
                "caller is neither owner nor issuer of the career".into(),
            ));
        }
        let owner = self.directory.resolve_by_did(token, owner).await?;
        let issuer = self.directory.resolve_by_did(token, issuer).await?;
        if !owner.is_employee() || !issuer.is_employer() {
            return Err(LifecycleError::PermissionDenied(
                "career owner must be an employee and issuer an employer".into(),
            ));
        }

        let career = self.content.fetch(content_hash).await?;
        let claim = Claim {
            id: Self::new_id(),
            owner: owner.did,
            issuer: issuer.did,
            title: title.into(),
            content: career.content,
            status: ClaimStateMachine::initial(CareerType::IpfsHash),
            career_type: CareerType::IpfsHash,
            career: content_hash.to_string(),
        };
        self.claims.insert(claim.clone()).await?;

        tracing::info!(
            claim_id = %claim.id,
            owner = %claim.owner,
            hash = %content_hash,
            "career claim recorded"
        );
        Ok(claim)
    }

    /// Claims where the caller is issuer (employers) or owner (employees).
    pub async fn list_claims(
        &self,
        token: &str,
        career_type: Option<CareerType>,
    ) -> Result<Vec<ClaimSummary>, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        let filter = if caller.is_employer() {
            ClaimFilter::by_issuer(caller.did)
        } else {
            ClaimFilter::by_owner(caller.did)
        };
        let claims = self.claims.find(&filter.with_career_type(career_type)).await?;
        Ok(claims.iter().map(Claim::summary).collect())
    }

    pub async fn get_claim(&self, token: &str, id: &str) -> Result<ClaimDetail, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        let claim = self
            .claims
            .find_by_id(id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("claim {}", id)))?;
        if !can_read(&caller, &claim) {
            return Err(LifecycleError::PermissionDenied(format!(
                "claim {} belongs to someone else",
                id
            )));
        }
        Ok(claim.detail())
    }

    /// The issuer accepts or rejects a PENDING ENC_VC claim.
    ///
    /// Accepting signs the claim content into a VC and seals it to the
    /// holder's key. A claim that is missing, not the caller's, or no longer
    /// pending reports not found.
    pub async fn update_claim_status(
        &self,
        token: &str,
        id: &str,
        decision: ClaimDecision,
    ) -> Result<Claim, LifecycleError> {
        let caller = self.directory.resolve_self(token).await?;
        if !caller.is_employer() {
            return Err(LifecycleError::PermissionDenied(
                "only employers can decide claims".into(),
            ));
        }
        let not_found = || LifecycleError::NotFound(format!("pending claim {}", id));
        let claim = self
            .claims
            .find_by_id(id)
            .await?
            .filter(|c| c.issuer == caller.did)
            .ok_or_else(not_found)?;

        let status = ClaimStateMachine::transition(claim.status, claim.career_type, decision.event())?;

        let career = match &decision {
            ClaimDecision::Reject => String::new(),
            ClaimDecision::Accept(keystore) => {
                if keystore.did != caller.did {
                    return Err(LifecycleError::PermissionDenied(
                        "keystore does not belong to the caller".into(),
                    ));
                }
                let vc = self
                    .issuer
                    .create_vc(&claim.owner, &claim.content, &caller.did, &keystore.priv_key)?;
                let holder_key = self.holder_public_key(&claim.owner).await?;
                encrypt_base64(&holder_key, vc.as_bytes())?
            }
        };

        let updated = self
            .claims
            .resolve_pending(id, status, career)
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(
            claim_id = %updated.id,
            issuer = %updated.issuer,
            status = %updated.status,
            "claim decided"
        );
        Ok(updated)
    }

    /// The key ECIES seals to: the DID identifier itself when it is a public
    /// key, otherwise the first key in the holder's DID document.
    async fn holder_public_key(&self, holder: &Did) -> Result<PublicKey, LifecycleError> {
        if let Some(hex) = holder.public_key_hex() {
            return Ok(PublicKey::from_hex(hex)?);
        }
        let document = self.resolver.resolve(holder).await?;
        document.public_keys().into_iter().next().ok_or_else(|| {
            LifecycleError::ClientFault(format!("{} publishes no public key to seal to", holder))
        })
    }
}

fn can_read(caller: &Identity, claim: &Claim) -> bool {
    (caller.is_employer() && claim.issuer == caller.did)
        || (caller.is_employee() && claim.owner == caller.did)
}

/// Open a sealed career with the holder's private key, returning the VC token.
pub fn decrypt_career(career: &str, holder_priv_key: &str) -> Result<String, LifecycleError> {
    let keypair = KeyPair::from_hex(holder_priv_key)?;
    let plaintext = decrypt_base64(&keypair, career)?;
    String::from_utf8(plaintext)
        .map_err(|_| LifecycleError::ClientFault("sealed career is not UTF-8".into()))
}
