//! Pending authorization requests, keyed by the CSRF `state` parameter.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::distributions::Alphanumeric;
use uuid::Uuid;

use crate::error::OAuthError;

/// How long a user has to come back from the provider.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

const STATE_LEN: usize = 32;

#[derive(Debug, Clone)]
struct PendingAuth {
    provider: String,
    user_id: Uuid,
    issued_at: Instant,
}

/// Single-use, expiring `state` tokens bound to a user and provider.
pub struct PendingAuthStore {
    ttl: Duration,
    pending: Mutex<HashMap<String, PendingAuth>>,
}

impl Default for PendingAuthStore {
    fn default() -> Self {
        Self::with_ttl(STATE_TTL)
    }
}

impl PendingAuthStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a new state token for `user_id` linking `provider`.
    pub fn issue(&self, provider: &str, user_id: Uuid) -> String {
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(STATE_LEN)
            .map(char::from)
            .collect();

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        pending.retain(|_, p| p.issued_at.elapsed() < ttl);
        pending.insert(
            state.clone(),
            PendingAuth {
                provider: provider.to_string(),
                user_id,
                issued_at: Instant::now(),
            },
        );
        state
    }

    /// Consume `state`, returning the user it was issued for.
    ///
    /// The token is removed whether or not it checks out, so it can never be
    /// replayed.
    pub fn take(&self, provider: &str, state: &str) -> Result<Uuid, OAuthError> {
        let entry = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(state)
            .ok_or(OAuthError::InvalidState)?;

        if entry.provider != provider || entry.issued_at.elapsed() >= self.ttl {
            return Err(OAuthError::InvalidState);
        }
        Ok(entry.user_id)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_single_use() {
        let store = PendingAuthStore::default();
        let user_id = Uuid::new_v4();
        let state = store.issue("dribbble", user_id);
        assert_eq!(state.len(), STATE_LEN);

        assert_eq!(store.take("dribbble", &state).unwrap(), user_id);
        assert!(matches!(store.take("dribbble", &state), Err(OAuthError::InvalidState)));
    }

    #[test]
    fn state_is_bound_to_provider() {
        let store = PendingAuthStore::default();
        let state = store.issue("dribbble", Uuid::new_v4());
        assert!(store.take("behance", &state).is_err());
        // Consumed by the failed attempt.
        assert!(store.take("dribbble", &state).is_err());
    }

    #[test]
    fn expired_state_is_rejected_and_purged() {
        let store = PendingAuthStore::with_ttl(Duration::ZERO);
        let state = store.issue("dribbble", Uuid::new_v4());
        assert!(store.take("dribbble", &state).is_err());

        store.issue("dribbble", Uuid::new_v4());
        store.issue("dribbble", Uuid::new_v4());
        // Each issue purges what already expired.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_state_is_rejected() {
        let store = PendingAuthStore::default();
        assert!(store.is_empty());
        assert!(store.take("dribbble", "forged").is_err());
    }
}
