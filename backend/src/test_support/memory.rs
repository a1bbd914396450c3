//! In-memory port adapters for exercising services and the HTTP surface
//! without Postgres, Redis or an object store.
//!
//! Each adapter counts the calls tests care about and can be told to fail
//! so error paths are reachable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    DocumentPersistenceError, DocumentRepository, ObjectStore, ObjectStoreError,
    PasswordHashError, PasswordHasher, SessionCache, SessionCacheError, SessionCacheKey,
    StoredObject, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Document, DocumentChanges, DocumentId, EmailAddress, NewDocument, NewUser, PasswordHash,
    ProfileChanges, StorageKey, User, UserId, UserProfile,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// User store keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
    find_by_id_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    /// Number of `find_by_id` calls so far.
    pub fn find_by_id_calls(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
    }

    /// Make every call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Remove a user, as if deleted out of band.
    pub fn remove(&self, id: &UserId) {
        lock(&self.users).remove(id);
    }

    fn check(&self) -> Result<(), UserPersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UserPersistenceError::connection("in-memory store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<Option<User>, UserPersistenceError> {
        self.check()?;
        let mut users = lock(&self.users);
        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        let stored = User {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        users.insert(stored.id, stored.clone());
        Ok(Some(stored))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.check()?;
        Ok(lock(&self.users)
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(lock(&self.users).get(id).cloned())
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.check()?;
        let mut users = lock(&self.users);
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            user.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = Some(last_name.clone());
        }
        user.updated_at = updated_at;
        Ok(Some(user.clone()))
    }
}

/// Document metadata store.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<HashMap<DocumentId, Document>>,
    writes: AtomicUsize,
}

impl InMemoryDocumentRepository {
    /// Number of update and delete statements issued.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of a stored row.
    pub fn get(&self, id: &DocumentId) -> Option<Document> {
        lock(&self.documents).get(id).cloned()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(
        &self,
        document: &NewDocument,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        let stored = Document {
            id: document.id,
            name: document.name.clone(),
            original_name: document.original_name.clone(),
            owner: document.owner,
            storage_key: document.storage_key.clone(),
            file_size: document.file_size,
            mime_type: document.mime_type.clone(),
            created_at: document.created_at,
            updated_at: document.created_at,
        };
        lock(&self.documents).insert(stored.id, stored.clone());
        Ok(Some(stored))
    }

    async fn find_by_id(
        &self,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        Ok(self.get(id))
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Document>, DocumentPersistenceError> {
        let mut owned: Vec<Document> = lock(&self.documents)
            .values()
            .filter(|document| document.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update(
        &self,
        id: &DocumentId,
        owner: &UserId,
        changes: &DocumentChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = lock(&self.documents);
        let Some(document) = documents
            .get_mut(id)
            .filter(|document| document.is_owned_by(owner))
        else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            document.name = name.clone();
        }
        document.updated_at = updated_at;
        Ok(Some(document.clone()))
    }

    async fn delete(
        &self,
        id: &DocumentId,
        owner: &UserId,
    ) -> Result<bool, DocumentPersistenceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = lock(&self.documents);
        let owned = documents
            .get(id)
            .is_some_and(|document| document.is_owned_by(owner));
        if owned {
            documents.remove(id);
        }
        Ok(owned)
    }
}

/// Session cache that records TTLs alongside entries.
#[derive(Default)]
pub struct InMemorySessionCache {
    entries: Mutex<HashMap<String, (UserProfile, Duration)>>,
    sets: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemorySessionCache {
    /// Number of successful `set` calls.
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Entry stored under `key` with its TTL.
    pub fn entry(&self, key: &SessionCacheKey) -> Option<(UserProfile, Duration)> {
        lock(&self.entries).get(key.as_str()).cloned()
    }

    /// Make every call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), SessionCacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SessionCacheError::backend("in-memory cache offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn get(&self, key: &SessionCacheKey) -> Result<Option<UserProfile>, SessionCacheError> {
        self.check()?;
        Ok(lock(&self.entries)
            .get(key.as_str())
            .map(|(profile, _)| profile.clone()))
    }

    async fn set(
        &self,
        key: &SessionCacheKey,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), SessionCacheError> {
        self.check()?;
        lock(&self.entries).insert(key.as_str().to_owned(), (profile.clone(), ttl));
        self.sets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &SessionCacheKey) -> Result<(), SessionCacheError> {
        self.check()?;
        lock(&self.entries).remove(key.as_str());
        Ok(())
    }
}

/// Blob store that signs URLs with a fake `memory://` scheme.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl InMemoryObjectStore {
    /// Bytes and content type stored under `key`.
    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        lock(&self.objects).get(key).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        key: &StorageKey,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, ObjectStoreError> {
        lock(&self.objects).insert(key.as_str().to_owned(), (bytes, content_type.to_owned()));
        Ok(StoredObject {
            key: key.clone(),
            etag: None,
        })
    }

    async fn signed_url(
        &self,
        key: &StorageKey,
        expiry: Option<Duration>,
    ) -> Result<Option<String>, ObjectStoreError> {
        if key.is_empty() {
            return Ok(None);
        }
        let expires = expiry.unwrap_or(Duration::from_secs(900)).as_secs();
        Ok(Some(format!("memory://{key}?expires={expires}")))
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), ObjectStoreError> {
        lock(&self.objects).remove(key.as_str());
        Ok(())
    }
}

/// Hasher that stores passwords with a marker prefix. Tests only.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextPasswordHasher;

const PLAINTEXT_PREFIX: &str = "plain$";

#[async_trait]
impl PasswordHasher for PlaintextPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("{PLAINTEXT_PREFIX}{plaintext}")))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let stored = hash
            .as_str()
            .strip_prefix(PLAINTEXT_PREFIX)
            .ok_or_else(|| PasswordHashError::malformed_hash("missing plaintext marker"))?;
        Ok(stored == plaintext)
    }
}
