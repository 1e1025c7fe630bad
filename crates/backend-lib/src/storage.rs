// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! User persistence abstraction with in-memory and flat-file implementations.
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use keyward_common::{UserId, UserRecord};
use thiserror::Error;
use tokio::fs as tokio_fs;
use uuid::Uuid;

/// Failures reported by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated")]
    Conflict,

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Trait for user storage backends.
///
/// Implementations own username uniqueness: a second insert with the same
/// username must fail with [`StorageError::Conflict`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look a user up by login name
    async fn find_by_username(&self, username: &str) -> Result<UserRecord, StorageError>;

    /// Look a user up by id
    async fn find_by_id(&self, id: UserId) -> Result<UserRecord, StorageError>;

    /// Persist a new user
    async fn insert(&self, record: UserRecord) -> Result<UserId, StorageError>;

    /// Replace the stored password hash of an existing user
    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), StorageError>;
}

/// In-memory store, used for tests and ephemeral deployments
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<UserId, UserRecord>>,
    usernames: Arc<DashMap<String, UserId>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<UserRecord, StorageError> {
        let id = *self.usernames.get(username).ok_or(StorageError::NotFound)?;
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<UserRecord, StorageError> {
        self.users
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(StorageError::NotFound)
    }

    async fn insert(&self, record: UserRecord) -> Result<UserId, StorageError> {
        let id = record.id;
        let mut claimed = false;
        // The index entry holds its shard lock until the record is in place.
        let _entry = self.usernames.entry(record.username.clone()).or_insert_with(|| {
            claimed = true;
            self.users.insert(id, record);
            id
        });

        if claimed {
            Ok(id)
        } else {
            Err(StorageError::Conflict)
        }
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), StorageError> {
        let mut user = self.users.get_mut(&id).ok_or(StorageError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

/// Flat-file implementation of the [`UserStore`] trait.
///
/// Layout under `root`:
/// - `users/<id>.json` holds one record
/// - `usernames/<base64url(username)>` holds the owning id; it is created
///   with an exclusive hard link so concurrent registrations cannot both win
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;
        fs::create_dir_all(root.join("usernames"))?;
        Ok(Self { root })
    }

    fn user_path(&self, id: UserId) -> PathBuf {
        self.root.join("users").join(format!("{id}.json"))
    }

    fn index_path(&self, username: &str) -> PathBuf {
        self.root
            .join("usernames")
            .join(URL_SAFE_NO_PAD.encode(username.as_bytes()))
    }

    /// Write a record through a temp file so readers never see a partial file.
    /// Every writer stages under its own name; the last rename wins.
    async fn write_record(&self, record: &UserRecord) -> Result<(), StorageError> {
        let path = self.user_path(record.id);
        let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4()));
        let json = serde_json::to_string_pretty(record)?;
        tokio_fs::write(&tmp, json).await?;
        if let Err(e) = tokio_fs::rename(&tmp, &path).await {
            let _ = tokio_fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for FlatFileStorage {
    async fn find_by_username(&self, username: &str) -> Result<UserRecord, StorageError> {
        let content = match tokio_fs::read_to_string(self.index_path(username)).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let id = content
            .trim()
            .parse::<UserId>()
            .map_err(|e| StorageError::Backend(format!("corrupt username index: {e}")))?;
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<UserRecord, StorageError> {
        let content = match tokio_fs::read_to_string(self.user_path(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn insert(&self, record: UserRecord) -> Result<UserId, StorageError> {
        // Record first, then claim the username; a reader that finds the
        // index entry always finds the record behind it.
        self.write_record(&record).await?;

        // The claim is a hard link of a fully written temp file, so the
        // index entry appears atomically with its content.
        let index = self.index_path(&record.username);
        let staged = index.with_extension(format!("{}.tmp", record.id));
        tokio_fs::write(&staged, record.id.to_string()).await?;
        let claim = tokio_fs::hard_link(&staged, &index).await;
        let _ = tokio_fs::remove_file(&staged).await;

        match claim {
            Ok(()) => Ok(record.id),
            Err(e) => {
                let _ = tokio_fs::remove_file(self.user_path(record.id)).await;
                if e.kind() == io::ErrorKind::AlreadyExists {
                    Err(StorageError::Conflict)
                } else {
                    Err(e.into())
                }
            },
        }
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), StorageError> {
        let mut record = self.find_by_id(id).await?;
        record.password_hash = password_hash.to_string();
        self.write_record(&record).await
    }
}
