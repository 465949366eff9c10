//! The Vouch service orchestrator.
//!
//! Wires the directory, resolver, content store and repositories from
//! configuration and serves the HTTP API.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use vouch_identity::{EthrRegistryClient, HttpIdentityDirectory, NetworkDidResolver};
use vouch_lifecycle::{
    ClaimRepository, HttpContentStore, InMemoryClaimRepository, InMemoryResumeRepository,
    ResumeRepository,
};

use crate::api;
use crate::config::{StorageBackend, VouchConfig};
use crate::state::{AppState, Backends};
use crate::storage::Storage;

pub struct VouchNode {
    config: VouchConfig,
    state: Arc<AppState>,
}

impl VouchNode {
    /// Build every collaborator. Nothing is contacted until a request needs it.
    pub fn new(config: VouchConfig) -> Result<Self> {
        let (claims, resumes) = Self::open_repositories(&config)?;

        let directory = Arc::new(HttpIdentityDirectory::new(
            config.directory.base_url(),
            config.directory.timeout(),
        )?);
        let registry = Arc::new(EthrRegistryClient::new(&config.resolver)?);
        let resolver = Arc::new(NetworkDidResolver::new(config.resolver.clone(), registry));
        let content = Arc::new(HttpContentStore::new(
            config.content_store.url_prefix.clone(),
            config.content_store.timeout(),
        )?);

        let state = Arc::new(AppState::new(
            &config.credentials,
            Backends {
                directory,
                resolver,
                claims,
                resumes,
                content,
            },
        ));

        if config.resolver.infura_project_id.is_none() {
            tracing::warn!("no Infura project id configured; DID resolution will fail");
        }
        tracing::info!(
            directory = %config.directory.base_url(),
            content_store = %config.content_store.url_prefix,
            storage = ?config.storage.backend,
            "Vouch node created"
        );

        Ok(Self { config, state })
    }

    fn open_repositories(
        config: &VouchConfig,
    ) -> Result<(Arc<dyn ClaimRepository>, Arc<dyn ResumeRepository>)> {
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("using in-memory storage");
                let claims: Arc<dyn ClaimRepository> = Arc::new(InMemoryClaimRepository::new());
                let resumes: Arc<dyn ResumeRepository> = Arc::new(InMemoryResumeRepository::new());
                Ok((claims, resumes))
            }
            StorageBackend::Rocksdb => {
                let storage = Arc::new(Storage::open(&config.storage.data_dir)?);
                tracing::info!(path = %config.storage.data_dir.display(), "storage initialized");
                let claims: Arc<dyn ClaimRepository> = storage.clone();
                let resumes: Arc<dyn ResumeRepository> = storage;
                Ok((claims, resumes))
            }
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Serve the HTTP API until the listener fails.
    pub async fn run(&self) -> Result<()> {
        let addr: SocketAddr = self.config.api_addr().parse()?;
        api::start_api_server(addr, self.state.clone()).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!(
            uptime_secs = self.state.start_time.elapsed().as_secs(),
            "shutting down Vouch node"
        );
        Ok(())
    }
}
