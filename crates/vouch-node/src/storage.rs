//! RocksDB storage backend for claims and resumes.

use anyhow::Result;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Mutex;

use vouch_core::ClaimStatus;
use vouch_lifecycle::{
    apply_resolution, Claim, ClaimFilter, ClaimRepository, LifecycleError, Resume, ResumeFilter,
    ResumeRepository,
};

/// Column family names for different data types.
const CF_CLAIMS: &str = "claims";
const CF_RESUMES: &str = "resumes";

/// RocksDB-backed storage. Records are JSON documents keyed by id.
pub struct Storage {
    db: DB,
    /// Serializes read-modify-write sequences.
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_CLAIMS, Options::default()),
            ColumnFamilyDescriptor::new(CF_RESUMES, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    /// Put a value into a column family.
    pub fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    /// Get a value from a column family.
    pub fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let value = self.db.get_cf(&cf, key)?;
        Ok(value)
    }

    /// Every value of a column family in key order.
    pub fn values(&self, cf_name: &str) -> Result<Vec<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            values.push(value.into_vec());
        }
        Ok(values)
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, id: &str) -> Result<Option<T>> {
        match self.get(cf_name, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, id: &str, record: &T) -> Result<()> {
        self.put(cf_name, id.as_bytes(), &serde_json::to_vec(record)?)
    }

    fn all_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        self.values(cf_name)?
            .iter()
            .map(|bytes| Ok(serde_json::from_slice(bytes)?))
            .collect()
    }

    fn insert_new<T: Serialize>(&self, cf_name: &str, id: &str, record: &T) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("storage write lock poisoned"))?;
        if self.get(cf_name, id.as_bytes())?.is_some() {
            anyhow::bail!("duplicate {} id {}", cf_name, id);
        }
        self.put_json(cf_name, id, record)
    }

    fn resolve_claim(&self, id: &str, status: ClaimStatus, career: String) -> Result<Option<Claim>> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("storage write lock poisoned"))?;
        let Some(mut claim) = self.get_json::<Claim>(CF_CLAIMS, id)? else {
            return Ok(None);
        };
        if !apply_resolution(&mut claim, status, career) {
            return Ok(None);
        }
        self.put_json(CF_CLAIMS, id, &claim)?;
        Ok(Some(claim))
    }
}

fn storage_error(e: anyhow::Error) -> LifecycleError {
    tracing::error!(error = %e, "storage failure");
    LifecycleError::Storage(e.to_string())
}

#[async_trait]
impl ClaimRepository for Storage {
    async fn insert(&self, claim: Claim) -> Result<(), LifecycleError> {
        self.insert_new(CF_CLAIMS, &claim.id, &claim)
            .map_err(storage_error)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Claim>, LifecycleError> {
        self.get_json(CF_CLAIMS, id).map_err(storage_error)
    }

    async fn find(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, LifecycleError> {
        let claims: Vec<Claim> = self.all_json(CF_CLAIMS).map_err(storage_error)?;
        Ok(claims.into_iter().filter(|c| filter.matches(c)).collect())
    }

    async fn resolve_pending(
        &self,
        id: &str,
        status: ClaimStatus,
        career: String,
    ) -> Result<Option<Claim>, LifecycleError> {
        self.resolve_claim(id, status, career).map_err(storage_error)
    }
}

#[async_trait]
impl ResumeRepository for Storage {
    async fn insert(&self, resume: Resume) -> Result<(), LifecycleError> {
        self.insert_new(CF_RESUMES, &resume.id, &resume)
            .map_err(storage_error)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Resume>, LifecycleError> {
        self.get_json(CF_RESUMES, id).map_err(storage_error)
    }

    async fn find(&self, filter: &ResumeFilter) -> Result<Vec<Resume>, LifecycleError> {
        let resumes: Vec<Resume> = self.all_json(CF_RESUMES).map_err(storage_error)?;
        Ok(resumes.into_iter().filter(|r| filter.matches(r)).collect())
    }
}
