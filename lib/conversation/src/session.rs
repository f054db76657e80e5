//! Chat session state.
//!
//! A session is keyed by the chat transport's conversation key (chat id,
//! phone number, ...). It holds the user's access token and the three
//! context tiers the service-function engine reads and updates.
//!
//! Selections cascade: choosing a different account drops the selected
//! service and object, choosing a different service drops the object.

use crate::error::SessionError;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use selfservice_core::{AccountContext, ObjectContextUpdate, SelectionContext, ServiceContext};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

const DEFAULT_TOKEN_SKEW_SECONDS: i64 = 30;

/// Whether a session holds a usable token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// No token stored.
    None,
    /// Token stored and not about to expire.
    Valid,
    /// Token stored but expired or within the expiry skew.
    Expired,
}

/// The token state with the raw token, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub state: TokenState,
    pub token: Option<String>,
}

impl TokenSnapshot {
    #[must_use]
    pub fn none() -> Self {
        Self {
            state: TokenState::None,
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Everything stored for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    token: Option<StoredToken>,
    /// Selected context tiers.
    pub context: SelectionContext,
    /// When the session was last touched.
    pub last_active_at: DateTime<Utc>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            token: None,
            context: SelectionContext::default(),
            last_active_at: Utc::now(),
        }
    }

    fn token_snapshot(&self, skew: TimeDelta, now: DateTime<Utc>) -> TokenSnapshot {
        match &self.token {
            None => TokenSnapshot::none(),
            Some(token) => TokenSnapshot {
                state: if now
                    .checked_add_signed(skew)
                    .is_none_or(|limit| token.expires_at <= limit)
                {
                    TokenState::Expired
                } else {
                    TokenState::Valid
                },
                token: Some(token.access_token.clone()),
            },
        }
    }

    fn select_account(&mut self, account: Option<AccountContext>) {
        if self.context.account != account {
            self.context.service = None;
            self.context.object = None;
        }
        self.context.account = account;
    }

    fn select_service(&mut self, service: Option<ServiceContext>) {
        if self.context.service != service {
            self.context.object = None;
        }
        self.context.service = service;
    }

    fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}

/// Trait for session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the token and whether it is still usable.
    async fn token_snapshot(&self, key: &str) -> Result<TokenSnapshot, SessionError>;

    /// Returns the access token if it is still valid.
    async fn access_token(&self, key: &str) -> Result<Option<String>, SessionError> {
        let snapshot = self.token_snapshot(key).await?;
        Ok(match snapshot.state {
            TokenState::Valid => snapshot.token,
            TokenState::None | TokenState::Expired => None,
        })
    }

    /// Stores a freshly issued token. All selections are reset.
    async fn store_token(
        &self,
        key: &str,
        access_token: String,
        expires_in: TimeDelta,
    ) -> Result<(), SessionError>;

    /// Returns the selected context tiers.
    async fn context(&self, key: &str) -> Result<SelectionContext, SessionError>;

    /// Selects (or with `None` clears) the account.
    async fn select_account(
        &self,
        key: &str,
        account: Option<AccountContext>,
    ) -> Result<(), SessionError>;

    /// Selects (or with `None` clears) the service.
    async fn select_service(
        &self,
        key: &str,
        service: Option<ServiceContext>,
    ) -> Result<(), SessionError>;

    /// Applies an object-context update from a service execution.
    async fn apply_update(
        &self,
        key: &str,
        update: &ObjectContextUpdate,
    ) -> Result<(), SessionError>;

    /// Removes everything stored for the session.
    async fn clear_session(&self, key: &str) -> Result<(), SessionError>;

    /// Returns the object context value.
    async fn object_context(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.context(key).await?.object)
    }

    /// Sets (or with `None` clears) the object context.
    async fn set_object_context(&self, key: &str, value: Option<String>) -> Result<(), SessionError> {
        let update = match value {
            Some(value) => ObjectContextUpdate::Set(value),
            None => ObjectContextUpdate::Clear,
        };
        self.apply_update(key, &update).await
    }
}

/// Process-local session store.
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
    token_skew: TimeDelta,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    /// Creates an empty store with a 30 second expiry skew.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            token_skew: TimeDelta::seconds(DEFAULT_TOKEN_SKEW_SECONDS),
        }
    }

    /// Tokens expiring within `skew` count as expired.
    #[must_use]
    pub fn with_token_skew(mut self, skew: TimeDelta) -> Self {
        self.token_skew = skew;
        self
    }

    /// Returns the number of sessions held.
    pub fn len(&self) -> Result<usize, SessionError> {
        Ok(self.read()?.len())
    }

    /// Returns true if no session is held.
    pub fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, SessionState>>, SessionError> {
        self.sessions.read().map_err(|e| SessionError::StorageFailed {
            reason: e.to_string(),
        })
    }

    fn update<T>(
        &self,
        key: &str,
        change: impl FnOnce(&mut SessionState) -> T,
    ) -> Result<T, SessionError> {
        let key = checked_key(key)?;
        let mut sessions = self.sessions.write().map_err(|e| SessionError::StorageFailed {
            reason: e.to_string(),
        })?;
        let state = sessions
            .entry(key.to_string())
            .or_insert_with(SessionState::new);
        let result = change(state);
        state.touch();
        Ok(result)
    }
}

fn checked_key(key: &str) -> Result<&str, SessionError> {
    let key = key.trim();
    if key.is_empty() {
        Err(SessionError::InvalidKey)
    } else {
        Ok(key)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn token_snapshot(&self, key: &str) -> Result<TokenSnapshot, SessionError> {
        let key = checked_key(key)?;
        Ok(self
            .read()?
            .get(key)
            .map_or_else(TokenSnapshot::none, |state| {
                state.token_snapshot(self.token_skew, Utc::now())
            }))
    }

    async fn store_token(
        &self,
        key: &str,
        access_token: String,
        expires_in: TimeDelta,
    ) -> Result<(), SessionError> {
        let expires_at = Utc::now()
            .checked_add_signed(expires_in)
            .ok_or(SessionError::InvalidExpiry)?;
        self.update(key, |state| {
            state.token = Some(StoredToken {
                access_token,
                expires_at,
            });
            state.context = SelectionContext::default();
        })?;
        debug!(session = %key, "access token stored");
        Ok(())
    }

    async fn context(&self, key: &str) -> Result<SelectionContext, SessionError> {
        let key = checked_key(key)?;
        Ok(self
            .read()?
            .get(key)
            .map(|state| state.context.clone())
            .unwrap_or_default())
    }

    async fn select_account(
        &self,
        key: &str,
        account: Option<AccountContext>,
    ) -> Result<(), SessionError> {
        self.update(key, |state| state.select_account(account))
    }

    async fn select_service(
        &self,
        key: &str,
        service: Option<ServiceContext>,
    ) -> Result<(), SessionError> {
        self.update(key, |state| state.select_service(service))
    }

    async fn apply_update(
        &self,
        key: &str,
        update: &ObjectContextUpdate,
    ) -> Result<(), SessionError> {
        if update.is_unchanged() {
            return Ok(());
        }
        self.update(key, |state| {
            state.context.object = update.apply(state.context.object.take());
        })
    }

    async fn clear_session(&self, key: &str) -> Result<(), SessionError> {
        let key = checked_key(key)?;
        self.sessions
            .write()
            .map_err(|e| SessionError::StorageFailed {
                reason: e.to_string(),
            })?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> AccountContext {
        AccountContext::new(id).with_name("Globex")
    }

    #[tokio::test]
    async fn unknown_session_has_no_token_or_context() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.token_snapshot("chat-1").await.expect("snapshot"), TokenSnapshot::none());
        assert_eq!(store.access_token("chat-1").await.expect("token"), None);
        assert!(store.context("chat-1").await.expect("context").is_empty());
    }

    #[tokio::test]
    async fn valid_token_is_returned() {
        let store = InMemorySessionStore::new();
        store
            .store_token("chat-1", "tok".to_string(), TimeDelta::hours(1))
            .await
            .expect("store");

        assert_eq!(
            store.access_token("chat-1").await.expect("token"),
            Some("tok".to_string())
        );
    }

    #[tokio::test]
    async fn token_inside_skew_is_expired() {
        let store = InMemorySessionStore::new();
        store
            .store_token("chat-1", "tok".to_string(), TimeDelta::seconds(10))
            .await
            .expect("store");

        let snapshot = store.token_snapshot("chat-1").await.expect("snapshot");
        assert_eq!(snapshot.state, TokenState::Expired);
        assert_eq!(snapshot.token.as_deref(), Some("tok"));
        assert_eq!(store.access_token("chat-1").await.expect("token"), None);

        let lenient = InMemorySessionStore::new().with_token_skew(TimeDelta::zero());
        lenient
            .store_token("chat-1", "tok".to_string(), TimeDelta::seconds(10))
            .await
            .expect("store");
        assert!(lenient.access_token("chat-1").await.expect("token").is_some());
    }

    #[tokio::test]
    async fn changing_account_clears_service_and_object() {
        let store = InMemorySessionStore::new();
        store.select_account("k", Some(account("ACC-1"))).await.expect("account");
        store
            .select_service("k", Some(ServiceContext::new("PRD-1")))
            .await
            .expect("service");
        store
            .set_object_context("k", Some("TT-1".to_string()))
            .await
            .expect("object");

        store.select_account("k", Some(account("ACC-1"))).await.expect("same account");
        assert!(store.context("k").await.expect("context").service.is_some());

        store.select_account("k", Some(account("ACC-2"))).await.expect("other account");
        let context = store.context("k").await.expect("context");
        assert_eq!(context.account.map(|a| a.id), Some("ACC-2".to_string()));
        assert!(context.service.is_none());
        assert!(context.object.is_none());
    }

    #[tokio::test]
    async fn changing_service_clears_object() {
        let store = InMemorySessionStore::new();
        store
            .select_service("k", Some(ServiceContext::new("PRD-1")))
            .await
            .expect("service");
        store
            .set_object_context("k", Some("TT-1".to_string()))
            .await
            .expect("object");
        store.select_service("k", None).await.expect("clear service");

        assert_eq!(store.object_context("k").await.expect("object"), None);
    }

    #[tokio::test]
    async fn apply_update_variants() {
        let store = InMemorySessionStore::new();
        store
            .apply_update("k", &ObjectContextUpdate::Set("TT-9".to_string()))
            .await
            .expect("set");
        store
            .apply_update("k", &ObjectContextUpdate::Unchanged)
            .await
            .expect("unchanged");
        assert_eq!(
            store.object_context("k").await.expect("object"),
            Some("TT-9".to_string())
        );

        store
            .apply_update("k", &ObjectContextUpdate::Clear)
            .await
            .expect("clear");
        assert_eq!(store.object_context("k").await.expect("object"), None);
    }

    #[tokio::test]
    async fn storing_a_token_resets_selections() {
        let store = InMemorySessionStore::new();
        store.select_account("k", Some(account("ACC-1"))).await.expect("account");
        store
            .store_token("k", "tok".to_string(), TimeDelta::hours(1))
            .await
            .expect("store");
        assert!(store.context("k").await.expect("context").is_empty());
    }

    #[tokio::test]
    async fn out_of_range_expiry_leaves_other_sessions_usable() {
        let store = InMemorySessionStore::new();
        store.select_account("chat-2", Some(account("ACC-1"))).await.expect("account");

        assert_eq!(
            store
                .store_token("chat-1", "tok".to_string(), TimeDelta::MAX)
                .await,
            Err(SessionError::InvalidExpiry)
        );
        assert_eq!(
            store
                .store_token("chat-1", "tok".to_string(), TimeDelta::MIN)
                .await,
            Err(SessionError::InvalidExpiry)
        );

        assert_eq!(store.token_snapshot("chat-1").await.expect("snapshot"), TokenSnapshot::none());
        let context = store.context("chat-2").await.expect("context");
        assert_eq!(context.account.map(|a| a.id), Some("ACC-1".to_string()));
        store
            .store_token("chat-2", "tok".to_string(), TimeDelta::hours(1))
            .await
            .expect("store");
    }

    #[tokio::test]
    async fn oversized_skew_marks_token_expired() {
        let store = InMemorySessionStore::new().with_token_skew(TimeDelta::MAX);
        store
            .store_token("chat-1", "tok".to_string(), TimeDelta::hours(1))
            .await
            .expect("store");
        assert_eq!(
            store.token_snapshot("chat-1").await.expect("snapshot").state,
            TokenState::Expired
        );
    }

    #[tokio::test]
    async fn blank_key_is_rejected() {
        let store = InMemorySessionStore::new();
        assert_eq!(
            store.select_account("  ", None).await,
            Err(SessionError::InvalidKey)
        );
        assert_eq!(store.context("").await, Err(SessionError::InvalidKey));
    }

    #[tokio::test]
    async fn clear_session_removes_state() {
        let store = InMemorySessionStore::new();
        store.select_account("k", Some(account("ACC-1"))).await.expect("account");
        assert_eq!(store.len().expect("len"), 1);

        store.clear_session("k").await.expect("clear");
        assert!(store.is_empty().expect("is_empty"));
    }
}
