//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, DocumentService, SessionResolver};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub sessions: Arc<dyn SessionResolver>,
    pub documents: Arc<dyn DocumentService>,
    /// Bytes read from an uploaded file part before it is cut off.
    pub upload_limit: usize,
}

/// Matches the document service's default maximum upload size.
pub const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use docvault::domain::{
    ///     AccountServiceImpl, CachedSessionResolver, DocumentServiceImpl, DocumentSettings,
    /// };
    /// use docvault::inbound::http::state::HttpState;
    /// use docvault::outbound::token::JwtTokenService;
    /// use docvault::test_support::{
    ///     FixtureClock, InMemoryDocumentRepository, InMemoryObjectStore, InMemorySessionCache,
    ///     InMemoryUserRepository, PlaintextPasswordHasher,
    /// };
    ///
    /// let clock = Arc::new(FixtureClock::default());
    /// let users = Arc::new(InMemoryUserRepository::default());
    /// let cache = Arc::new(InMemorySessionCache::default());
    /// let tokens = Arc::new(
    ///     JwtTokenService::new(b"secret", std::time::Duration::from_secs(60), clock.clone())
    ///         .expect("token service"),
    /// );
    /// let state = HttpState::new(
    ///     Arc::new(AccountServiceImpl::new(
    ///         users.clone(),
    ///         Arc::new(PlaintextPasswordHasher),
    ///         tokens.clone(),
    ///         cache.clone(),
    ///         clock.clone(),
    ///     )),
    ///     Arc::new(CachedSessionResolver::new(users, cache, tokens)),
    ///     Arc::new(DocumentServiceImpl::new(
    ///         Arc::new(InMemoryDocumentRepository::default()),
    ///         Arc::new(InMemoryObjectStore::default()),
    ///         clock,
    ///         DocumentSettings::default(),
    ///     )),
    /// );
    /// let _sessions = state.sessions.clone();
    /// ```
    pub fn new(
        accounts: Arc<dyn AccountService>,
        sessions: Arc<dyn SessionResolver>,
        documents: Arc<dyn DocumentService>,
    ) -> Self {
        Self {
            accounts,
            sessions,
            documents,
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }

    /// Stop buffering file parts after `limit` bytes.
    #[must_use]
    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }
}
