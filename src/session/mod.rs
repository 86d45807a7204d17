//! Session state derived from the stored bearer token.
//!
//! Nothing is cached: every query re-reads the store and re-decodes the
//! token, so a token that expires between two calls is seen as expired by
//! the second one. Any decode or storage failure reads as "logged out".

pub mod claims;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use claims::{Claims, DecodeError};
pub use store::{MemoryStore, StoreError, TokenStore};

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist `token`, replacing any previous one. The value is not
    /// inspected.
    pub fn store(&self, token: &str) -> Result<(), StoreError> {
        self.store.save(token)
    }

    /// Forget the token. No-op when none is stored.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove()
    }

    pub fn current_token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Could not read session token: {}", e);
                None
            }
        }
    }

    pub fn claims(&self) -> Option<Claims> {
        let token = self.current_token()?;
        match Claims::decode(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                log::debug!("Stored token did not decode: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.claims().is_some_and(|c| c.is_live_at(now))
    }

    pub fn current_username(&self) -> Option<String> {
        self.claims().and_then(|c| c.subject)
    }

    /// Reads the `is_admin` claim only; callers that gate admin actions
    /// should also require [`Session::is_authenticated`].
    pub fn has_admin_role(&self) -> bool {
        self.claims().is_some_and(|c| c.is_admin)
    }

    /// Authenticated and holding the admin claim.
    pub fn can_administer(&self) -> bool {
        self.can_administer_at(Utc::now())
    }

    pub fn can_administer_at(&self, now: DateTime<Utc>) -> bool {
        self.is_authenticated_at(now) && self.has_admin_role()
    }
}
