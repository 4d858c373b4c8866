//! Session gate
//!
//! A mobile-number login stored in a key/value session. The storage is
//! injected through `SessionStorage`; the server keeps one
//! `MemorySessionStorage` per browser in a `SessionRegistry`.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};

/// Set to `"true"` while signed in
pub const AUTH_KEY: &str = "isAuthenticated";
/// Mobile number of the signed-in user
pub const USER_KEY: &str = "userMobile";

pub const MOBILE_ERROR: &str = "Mobile number must be exactly 10 digits";

// ==================== Storage ====================

/// Key/value session storage
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// HashMap-backed session storage
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    values: HashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

// ==================== Login ====================

/// Validated login input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub mobile: String,
    /// Last six digits of the mobile number; never checked
    pub password: String,
}

/// Accept exactly ten ASCII digits
pub fn validate_mobile(input: &str) -> CoreResult<Credentials> {
    static MOBILE_PATTERN: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let pattern = MOBILE_PATTERN.get_or_init(|| regex::Regex::new(r"^[0-9]{10}$").unwrap());

    if !pattern.is_match(input) {
        return Err(CoreError::ValidationError {
            message: MOBILE_ERROR.to_string(),
        });
    }

    Ok(Credentials {
        mobile: input.to_string(),
        password: input[input.len() - 6..].to_string(),
    })
}

pub fn is_authenticated<S: SessionStorage + ?Sized>(storage: &S) -> bool {
    storage.get(AUTH_KEY).as_deref() == Some("true")
}

/// Mobile number of the signed-in user
pub fn current_user<S: SessionStorage + ?Sized>(storage: &S) -> Option<String> {
    if is_authenticated(storage) {
        storage.get(USER_KEY)
    } else {
        None
    }
}

/// Validate `input` and sign in. Invalid input leaves the storage untouched.
pub fn login<S: SessionStorage + ?Sized>(storage: &mut S, input: &str) -> CoreResult<Credentials> {
    let credentials = validate_mobile(input)?;
    storage.set(AUTH_KEY, "true".to_string());
    storage.set(USER_KEY, credentials.mobile.clone());
    Ok(credentials)
}

pub fn logout<S: SessionStorage + ?Sized>(storage: &mut S) {
    storage.remove(AUTH_KEY);
    storage.remove(USER_KEY);
}

// ==================== Registry ====================

/// Session lifetime unless configured otherwise
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;

#[derive(Debug)]
struct SessionEntry {
    storage: MemorySessionStorage,
    created_at: DateTime<Utc>,
}

/// Server-side sessions keyed by session id. Sessions expire `ttl` after
/// creation; expired entries are swept on every `create`.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<String, SessionEntry>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    fn is_live(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.created_at < self.ttl
    }

    /// Drop expired sessions, returning how many were removed
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, entry| now - entry.created_at < ttl);
        let removed = before - self.sessions.len();
        if removed > 0 {
            log::debug!("Swept {} expired sessions", removed);
        }
        removed
    }

    /// Register an empty session under `id`, replacing any existing one
    pub fn create(&mut self, id: String, now: DateTime<Utc>) -> &mut MemorySessionStorage {
        self.sweep(now);
        let entry = self.sessions.entry(id).or_insert_with(|| SessionEntry {
            storage: MemorySessionStorage::new(),
            created_at: now,
        });
        entry.storage = MemorySessionStorage::new();
        entry.created_at = now;
        &mut entry.storage
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MemorySessionStorage> {
        self.sessions.get_mut(id).map(|entry| &mut entry.storage)
    }

    pub fn remove(&mut self, id: &str) -> Option<MemorySessionStorage> {
        self.sessions.remove(id).map(|entry| entry.storage)
    }

    /// Signed-in user for session `id`, unless the session has expired
    pub fn user(&self, id: &str, now: DateTime<Utc>) -> Option<String> {
        self.sessions
            .get(id)
            .filter(|entry| self.is_live(entry, now))
            .and_then(|entry| current_user(&entry.storage))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
