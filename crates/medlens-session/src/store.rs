//! The session store.
//!
//! Owns the three persisted keys (`auth_token`, `auth_user`, `auth_time`)
//! and the in-memory bearer token the API client attaches to requests.
//! A session is valid for `ttl` after login; anything expired or corrupt
//! found in storage is cleared, never reported.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use medlens_contracts::{
    error::{MedlensError, MedlensResult},
    session::{AuthResponse, Session, User, SESSION_KEYS, TIME_KEY, TOKEN_KEY, USER_KEY},
};
use medlens_core::traits::{Clock, SessionStorage};

/// Validity window of a session when none is configured.
pub const DEFAULT_TTL_HOURS: i64 = 24;

pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    clock: Box<dyn Clock>,
    ttl: Duration,
    token: Mutex<Option<String>>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SessionStorage>, clock: Box<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            token: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load the persisted session and adopt its token.
    ///
    /// Returns `true` when a valid session was found.
    pub fn init(&self) -> MedlensResult<bool> {
        let session = self.current()?;
        self.set_token(session.as_ref().map(|s| s.token.clone()));
        match &session {
            Some(s) => info!(username = %s.user.username, role = %s.user.role, "session restored"),
            None => debug!("no stored session"),
        }
        Ok(session.is_some())
    }

    /// Drop in-memory state. Storage is left as is.
    pub fn teardown(&self) {
        self.set_token(None);
    }

    /// The stored session, if one exists and has not expired.
    ///
    /// A stored user record that does not parse, or a login time older than
    /// the ttl, clears all three keys. A missing login time counts as the
    /// epoch, so such a session is always expired.
    pub fn current(&self) -> MedlensResult<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user_raw = self.storage.get(USER_KEY)?.filter(|u| !u.is_empty());
        let (Some(token), Some(user_raw)) = (token, user_raw) else {
            return Ok(None);
        };

        let user: User = match serde_json::from_str(&user_raw) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "stored user record is malformed, clearing session");
                self.clear()?;
                return Ok(None);
            }
        };

        let authenticated_at = self
            .storage
            .get(TIME_KEY)?
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_default();

        let age = self.clock.now() - authenticated_at;
        if age > self.ttl {
            info!(
                username = %user.username,
                age_hours = age.num_hours(),
                "session expired, clearing"
            );
            self.clear()?;
            return Ok(None);
        }

        Ok(Some(Session {
            token,
            user,
            authenticated_at,
        }))
    }

    /// Persist a successful login and adopt its token.
    pub fn store(&self, auth: &AuthResponse) -> MedlensResult<Session> {
        let now = self.clock.now();
        let user_json = serde_json::to_string(&auth.user).map_err(|e| MedlensError::Storage {
            reason: format!("cannot serialize user: {e}"),
        })?;

        self.storage.set(TOKEN_KEY, &auth.access_token)?;
        self.storage.set(USER_KEY, &user_json)?;
        self.storage.set(TIME_KEY, &now.timestamp_millis().to_string())?;
        self.set_token(Some(auth.access_token.clone()));

        info!(username = %auth.user.username, role = %auth.user.role, "session stored");
        Ok(Session {
            token: auth.access_token.clone(),
            user: auth.user.clone(),
            authenticated_at: now,
        })
    }

    /// Remove every session key and forget the in-memory token.
    ///
    /// All keys are attempted; the first failure is returned.
    pub fn clear(&self) -> MedlensResult<()> {
        self.set_token(None);
        let mut first_err = None;
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to remove session key");
                first_err.get_or_insert(e);
            }
        }
        debug!("session cleared");
        first_err.map_or(Ok(()), Err)
    }

    /// The bearer token requests are sent with.
    pub fn token(&self) -> Option<String> {
        self.token
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    fn set_token(&self, token: Option<String>) {
        match self.token.lock() {
            Ok(mut guard) => *guard = token,
            Err(e) => *e.into_inner() = token,
        }
    }
}
