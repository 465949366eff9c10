//! HTTP API server for the Vouch service.
//!
//! Every response is a `{ "error": string|null, "content": any }` envelope.
//! The access token is read from the `access_token` cookie or a bearer
//! `Authorization` header.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use vouch_core::{CareerType, ClaimContent, ClaimStatus, CoreError, Did, ErrorKind, Keystore};
use vouch_credentials::{CodecError, W3cCredential, W3cPresentation};
use vouch_identity::{generate_keystore, DidDocument, IdentityError};
use vouch_lifecycle::{
    CareerEntry, ClaimDecision, ClaimDetail, ClaimSummary, LifecycleError, NewResume,
    ResumeDetail, ResumeSummary,
};

use crate::state::AppState;

// --- Envelope & errors ---

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub error: Option<String>,
    pub content: T,
}

pub type ApiError = (StatusCode, Json<Envelope<Value>>);
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

fn ok<T>(content: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        error: None,
        content,
    }))
}

/// Errors that know their public kind.
trait Classified: Display {
    fn kind(&self) -> ErrorKind;

    fn downstream(&self) -> Option<(u16, String)> {
        None
    }
}

impl Classified for LifecycleError {
    fn kind(&self) -> ErrorKind {
        LifecycleError::kind(self)
    }

    fn downstream(&self) -> Option<(u16, String)> {
        LifecycleError::downstream(self)
    }
}

impl Classified for IdentityError {
    fn kind(&self) -> ErrorKind {
        IdentityError::kind(self)
    }

    fn downstream(&self) -> Option<(u16, String)> {
        IdentityError::downstream(self)
    }
}

impl Classified for CodecError {
    fn kind(&self) -> ErrorKind {
        CodecError::kind(self)
    }
}

impl Classified for CoreError {
    fn kind(&self) -> ErrorKind {
        CoreError::kind(self)
    }
}

fn fail<E: Classified>(e: E) -> ApiError {
    let kind = e.kind();
    if kind == ErrorKind::Unhandled {
        tracing::error!(error = %e, "unhandled error");
    } else {
        tracing::debug!(error = %e, ?kind, "request failed");
    }

    let (status, content) = match e.downstream() {
        Some((status, body)) if kind == ErrorKind::MicroserviceError => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            serde_json::from_str(&body).unwrap_or(Value::String(body)),
        ),
        _ => (
            StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Value::Null,
        ),
    };
    (
        status,
        Json(Envelope {
            error: Some(kind.public_message().to_string()),
            content,
        }),
    )
}

fn bad_request(detail: impl Into<String>) -> ApiError {
    fail(LifecycleError::ClientFault(detail.into()))
}

/// JSON body extractor whose rejections are enveloped client faults.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.body_text())),
        }
    }
}

/// Query-string extractor whose rejections are enveloped client faults.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.body_text())),
        }
    }
}

/// The caller's access token, or empty when none was sent. An empty
/// cookie value falls through to the `Authorization` header.
fn access_token(headers: &HeaderMap) -> String {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix("access_token="))
        .find(|token| !token.is_empty())
        .map(str::to_string);
    if let Some(token) = from_cookie {
        return token;
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn parse_did(raw: &str) -> Result<Did, ApiError> {
    Did::new(raw).map_err(fail)
}

// --- Request & response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVcRequest {
    #[serde(rename = "holderDID")]
    pub holder_did: String,
    pub claim: Value,
    #[serde(rename = "issuerDID")]
    pub issuer_did: String,
    pub issuer_priv: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVpRequest {
    #[serde(rename = "holderDID")]
    pub holder_did: String,
    pub holder_priv: String,
    pub verifiable_credentials: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyVcRequest {
    pub verifiable_credential: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyVpRequest {
    pub verifiable_presentation: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedVcResponse {
    pub issuer: String,
    pub subject: String,
    pub jwt: String,
    pub payload: Value,
    pub verifiable_credential: W3cCredential,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedVpResponse {
    pub holder: String,
    pub jwt: String,
    pub payload: Value,
    pub verifiable_presentation: W3cPresentation,
}

/// `POST /claim` body. `claim` content is a request to an issuer and wins
/// when both shapes are present; otherwise a `career` hash with an `owner`
/// records an attested career.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateClaimRequest {
    Claim {
        issuer: String,
        title: String,
        claim: ClaimContent,
    },
    Career {
        owner: String,
        issuer: String,
        title: String,
        career: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimQuery {
    pub career_type: Option<u8>,
}

#[derive(Deserialize)]
pub struct UpdateClaimRequest {
    pub status: u8,
    #[serde(default)]
    pub keystore: Option<Keystore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub keystore: Keystore,
    pub verifier: String,
    pub title: String,
    pub position_id: i64,
    #[serde(default)]
    pub cover_letter_ids: Vec<i64>,
    #[serde(default)]
    pub careers: Vec<CareerEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeQuery {
    pub position_id: Option<i64>,
}

// --- SSI handlers ---

async fn handle_health(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    ok(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_generate_did(State(state): State<Arc<AppState>>) -> ApiResult<Keystore> {
    let keystore = generate_keystore(&state.default_chain).map_err(fail)?;
    ok(keystore)
}

async fn handle_resolve_did(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
) -> ApiResult<DidDocument> {
    let did = parse_did(&did)?;
    let document = state.resolver.resolve(&did).await.map_err(fail)?;
    ok(document)
}

async fn handle_create_vc(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateVcRequest>,
) -> ApiResult<String> {
    let holder = parse_did(&req.holder_did)?;
    let issuer = parse_did(&req.issuer_did)?;
    if !req.claim.as_object().is_some_and(|fields| !fields.is_empty()) {
        return Err(bad_request("claim must be a non-empty object"));
    }
    let vc = state
        .issuer
        .create_vc(&holder, &req.claim, &issuer, &req.issuer_priv)
        .map_err(fail)?;
    ok(vc)
}

async fn handle_create_vp(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateVpRequest>,
) -> ApiResult<String> {
    let holder = parse_did(&req.holder_did)?;
    let vp = state
        .holder
        .create_vp(&holder, &req.holder_priv, &req.verifiable_credentials)
        .map_err(fail)?;
    ok(vp)
}

async fn handle_verify_vc(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<VerifyVcRequest>,
) -> ApiResult<VerifiedVcResponse> {
    let verified = state
        .verifier
        .verify_vc(&req.verifiable_credential)
        .await
        .map_err(fail)?;
    ok(VerifiedVcResponse {
        issuer: verified.issuer.to_string(),
        subject: verified.subject.to_string(),
        jwt: verified.jwt,
        payload: verified.payload,
        verifiable_credential: verified.verifiable_credential,
    })
}

async fn handle_verify_vp(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<VerifyVpRequest>,
) -> ApiResult<VerifiedVpResponse> {
    let verified = state
        .verifier
        .verify_vp(&req.verifiable_presentation)
        .await
        .map_err(fail)?;
    ok(VerifiedVpResponse {
        holder: verified.holder.to_string(),
        jwt: verified.jwt,
        payload: verified.payload,
        verifiable_presentation: verified.verifiable_presentation,
    })
}

// --- Claim handlers ---

async fn handle_create_claim(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateClaimRequest>,
) -> ApiResult<ClaimDetail> {
    let token = access_token(&headers);
    let claim = match req {
        CreateClaimRequest::Claim {
            issuer,
            title,
            claim,
        } => {
            let issuer = parse_did(&issuer)?;
            state
                .claims
                .create_claim(&token, &issuer, title, claim)
                .await
        }
        CreateClaimRequest::Career {
            owner,
            issuer,
            title,
            career,
        } => {
            let owner = parse_did(&owner)?;
            let issuer = parse_did(&issuer)?;
            state
                .claims
                .create_career_claim(&token, &owner, &issuer, title, &career)
                .await
        }
    }
    .map_err(fail)?;
    ok(claim.detail())
}

async fn handle_list_claims(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<ClaimQuery>,
) -> ApiResult<Vec<ClaimSummary>> {
    let career_type = query
        .career_type
        .map(CareerType::try_from)
        .transpose()
        .map_err(fail)?;
    let claims = state
        .claims
        .list_claims(&access_token(&headers), career_type)
        .await
        .map_err(fail)?;
    ok(claims)
}

async fn handle_get_claim(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<ClaimDetail> {
    let claim = state
        .claims
        .get_claim(&access_token(&headers), &id)
        .await
        .map_err(fail)?;
    ok(claim)
}

async fn handle_update_claim(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateClaimRequest>,
) -> ApiResult<ClaimDetail> {
    let status = ClaimStatus::try_from(req.status).map_err(fail)?;
    let decision = match (status, req.keystore) {
        (ClaimStatus::Accepted, Some(keystore)) => ClaimDecision::Accept(keystore),
        (ClaimStatus::Accepted, None) => return Err(bad_request("accepting requires a keystore")),
        (ClaimStatus::Rejected, _) => ClaimDecision::Reject,
        (ClaimStatus::Pending, _) => return Err(bad_request("status must be ACCEPTED or REJECTED")),
    };
    let claim = state
        .claims
        .update_claim_status(&access_token(&headers), &id, decision)
        .await
        .map_err(fail)?;
    ok(claim.detail())
}

// --- Resume handlers ---

async fn handle_create_resume(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateResumeRequest>,
) -> ApiResult<ResumeSummary> {
    let request = NewResume {
        verifier: parse_did(&req.verifier)?,
        title: req.title,
        position_id: req.position_id,
        cover_letter_ids: req.cover_letter_ids,
        careers: req.careers,
    };
    let resume = state
        .resumes
        .create_resume(&access_token(&headers), &req.keystore, request)
        .await
        .map_err(fail)?;
    ok(resume.summary())
}

async fn handle_list_resumes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<ResumeQuery>,
) -> ApiResult<Vec<ResumeSummary>> {
    let resumes = state
        .resumes
        .list_resumes(&access_token(&headers), query.position_id)
        .await
        .map_err(fail)?;
    ok(resumes)
}

async fn handle_get_resume(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<ResumeDetail> {
    let resume = state
        .resumes
        .get_resume(&access_token(&headers), &id)
        .await
        .map_err(fail)?;
    ok(resume)
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v0/health", get(handle_health))
        .route("/api/v0/ssi/did", get(handle_generate_did))
        .route("/api/v0/ssi/did-document/{did}", get(handle_resolve_did))
        .route("/api/v0/ssi/verifiable-credential", post(handle_create_vc))
        .route("/api/v0/ssi/verifiable-presentation", post(handle_create_vp))
        .route("/api/v0/ssi/verified-credential", post(handle_verify_vc))
        .route("/api/v0/ssi/verified-presentation", post(handle_verify_vp))
        .route("/api/v0/claim", post(handle_create_claim).get(handle_list_claims))
        .route("/api/v0/claim/{id}", get(handle_get_claim).patch(handle_update_claim))
        .route("/api/v0/resume", post(handle_create_resume).get(handle_list_resumes))
        .route("/api/v0/resume/{id}", get(handle_get_resume))
        .with_state(state)
}

pub async fn start_api_server(listen_addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
