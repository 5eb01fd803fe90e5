// ============================
// accountd-backend/src/storage.rs
// ============================
//! Account store abstraction with flat-file and in-memory implementations.
//!
//! Both implementations enforce email uniqueness themselves and report a
//! collision as [`StoreError::DuplicateEmail`].
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use accountd_common::{AccountId, AccountResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs as tokio_fs, sync::RwLock};
use uuid::Uuid;

/// A stored account document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    /// PHC-formatted scrypt hash
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    fn from_new(new: NewAccount) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public fields only
    pub fn to_response(&self) -> AccountResponse {
        AccountResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Fields for a record about to be inserted
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Field replacements for an existing record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }

    fn apply(self, record: &mut AccountRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(email) = self.email {
            record.email = email;
        }
        if let Some(hash) = self.password_hash {
            record.password_hash = hash;
        }
        record.updated_at = Utc::now();
    }
}

/// Store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for account store backends
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Look a record up by its email
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Look a record up by id
    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError>;

    /// Insert a new record, assigning its id
    async fn create(&self, new: NewAccount) -> Result<AccountRecord, StoreError>;

    /// Apply `changes` and return the stored result, or `None` for an unknown id
    async fn update(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountRecord>, StoreError>;

    /// Delete a record. Returns whether it existed.
    async fn remove(&self, id: AccountId) -> Result<bool, StoreError>;
}

/// Flat-file implementation: one JSON document per account
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    /// email -> id. The write half also serializes all mutations.
    index: Arc<RwLock<HashMap<String, AccountId>>>,
}

impl FlatFileStorage {
    /// Open (or create) a store under `root`, rebuilding the email index from disk
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let accounts = root.join("accounts");
        fs::create_dir_all(&accounts)?;

        let mut index = HashMap::new();
        for entry in fs::read_dir(&accounts)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record: AccountRecord = serde_json::from_str(&fs::read_to_string(&path)?)
                .map_err(|e| anyhow::anyhow!("corrupt account file {}: {e}", path.display()))?;
            if let Some(existing) = index.insert(record.email.clone(), record.id) {
                anyhow::bail!(
                    "email {} is claimed by both {existing} and {}",
                    record.email,
                    record.id
                );
            }
        }
        tracing::info!(accounts = index.len(), root = %root.display(), "opened account store");

        Ok(Self {
            root,
            index: Arc::new(RwLock::new(index)),
        })
    }

    fn record_path(&self, id: AccountId) -> PathBuf {
        self.root.join("accounts").join(format!("{id}.json"))
    }

    async fn read_record(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        match tokio_fs::read_to_string(self.record_path(id)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file so a crash never leaves a torn document
    async fn write_record(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let path = self.record_path(record.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FlatFileStorage {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let index = self.index.read().await;
        match index.get(email) {
            Some(id) => self.read_record(*id).await,
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        let _index = self.index.read().await;
        self.read_record(id).await
    }

    async fn create(&self, new: NewAccount) -> Result<AccountRecord, StoreError> {
        let mut index = self.index.write().await;
        if index.contains_key(&new.email) {
            return Err(StoreError::DuplicateEmail(new.email));
        }

        let record = AccountRecord::from_new(new);
        self.write_record(&record).await?;
        index.insert(record.email.clone(), record.id);
        Ok(record)
    }

    async fn update(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let mut index = self.index.write().await;
        let Some(mut record) = self.read_record(id).await? else {
            return Ok(None);
        };

        let old_email = record.email.clone();
        if let Some(email) = &changes.email {
            if index.get(email).is_some_and(|owner| *owner != id) {
                return Err(StoreError::DuplicateEmail(email.clone()));
            }
        }

        changes.apply(&mut record);
        self.write_record(&record).await?;
        if record.email != old_email {
            index.remove(&old_email);
            index.insert(record.email.clone(), id);
        }
        Ok(Some(record))
    }

    async fn remove(&self, id: AccountId) -> Result<bool, StoreError> {
        let mut index = self.index.write().await;
        let Some(record) = self.read_record(id).await? else {
            return Ok(false);
        };

        tokio_fs::remove_file(self.record_path(id)).await?;
        index.remove(&record.email);
        Ok(true)
    }
}

/// In-memory implementation, for tests and ephemeral runs
#[derive(Clone, Default)]
pub struct MemoryStorage {
    records: Arc<DashMap<AccountId, AccountRecord>>,
    emails: Arc<DashMap<String, AccountId>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Claim `email` for `id`. The entry API makes check-and-claim one step.
    fn claim_email(&self, email: &str, id: AccountId) -> Result<(), StoreError> {
        let owner = *self.emails.entry(email.to_string()).or_insert(id);
        if owner == id {
            Ok(())
        } else {
            Err(StoreError::DuplicateEmail(email.to_string()))
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStorage {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn create(&self, new: NewAccount) -> Result<AccountRecord, StoreError> {
        let record = AccountRecord::from_new(new);
        self.claim_email(&record.email, record.id)?;
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: AccountId,
        changes: AccountChanges,
    ) -> Result<Option<AccountRecord>, StoreError> {
        // The record guard is held across claim and apply so updates of one id serialize
        let Some(mut record) = self.records.get_mut(&id) else {
            return Ok(None);
        };
        let old_email = record.email.clone();

        let new_email = changes.email.clone().filter(|email| *email != old_email);
        if let Some(email) = &new_email {
            self.claim_email(email, id)?;
        }

        changes.apply(&mut *record);
        if new_email.is_some() {
            self.emails.remove(&old_email);
        }
        Ok(Some(record.value().clone()))
    }

    async fn remove(&self, id: AccountId) -> Result<bool, StoreError> {
        match self.records.remove(&id) {
            Some((_, record)) => {
                self.emails.remove(&record.email);
                Ok(true)
            },
            None => Ok(false),
        }
    }
}
