//! Social account linking over OAuth.
//!
//! The flow is two calls: `initiate_auth` hands back the provider's authorize
//! URL with a fresh `state`, and `complete_auth` turns the callback into a
//! `ProviderProfile`. Recording the outcome against the user's social links is
//! separate (`record_connection`, `disconnect`).

pub mod dribbble;
pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{DatabaseError, OAuthError};
use crate::store::Database;
use crate::store::models::SocialLinks;

pub use dribbble::DribbbleProvider;
pub use state::PendingAuthStore;

/// Providers whose connection can be recorded in social links.
pub const LINKABLE_PROVIDERS: [&str; 1] = ["dribbble"];

/// What a provider tells us about the linked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub provider: String,
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_url: Option<String>,
}

/// Query parameters the provider redirects back with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// A completed authorization.
#[derive(Debug, Clone)]
pub struct CompletedAuth {
    pub user_id: Uuid,
    pub profile: ProviderProfile,
}

/// One OAuth identity provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Provider id as used in routes and social-link columns.
    fn name(&self) -> &str;

    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<String, OAuthError>;

    /// Trade an authorization code for an access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, OAuthError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError>;
}

/// Registered providers plus the pending-state store.
pub struct OAuthService {
    public_url: String,
    providers: HashMap<String, Arc<dyn OAuthProvider>>,
    pending: PendingAuthStore,
}

impl OAuthService {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into().trim_end_matches('/').to_string(),
            providers: HashMap::new(),
            pending: PendingAuthStore::default(),
        }
    }

    /// Build from configuration, registering every provider with credentials.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut service = Self::new(&config.public_url);
        if let Some(dribbble) = &config.dribbble {
            service = service.with_provider(Arc::new(DribbbleProvider::new(dribbble.clone())));
        }
        service
    }

    pub fn with_provider(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    pub fn with_pending_store(mut self, pending: PendingAuthStore) -> Self {
        self.pending = pending;
        self
    }

    pub fn redirect_uri(&self, provider: &str) -> String {
        format!("{}/api/oauth/{provider}/callback", self.public_url)
    }

    fn provider(&self, name: &str) -> Result<&Arc<dyn OAuthProvider>, OAuthError> {
        match self.providers.get(name) {
            Some(p) => Ok(p),
            None if LINKABLE_PROVIDERS.contains(&name) => {
                Err(OAuthError::NotConfigured(name.to_string()))
            }
            None => Err(OAuthError::UnsupportedProvider(name.to_string())),
        }
    }

    /// Start linking `provider` for `user_id`. Returns the URL to redirect to.
    pub fn initiate_auth(&self, provider: &str, user_id: Uuid) -> Result<String, OAuthError> {
        let p = self.provider(provider)?;
        let state = self.pending.issue(provider, user_id);
        info!(provider, user_id = %user_id, "OAuth flow started");
        p.authorize_url(&state, &self.redirect_uri(provider))
    }

    /// Finish the flow from the provider's callback.
    pub async fn complete_auth(
        &self,
        provider: &str,
        params: &CallbackParams,
    ) -> Result<CompletedAuth, OAuthError> {
        let p = self.provider(provider)?;

        let state = params.state.as_deref().ok_or(OAuthError::InvalidState)?;
        let user_id = self.pending.take(provider, state)?;

        if let Some(error) = &params.error {
            let detail = params.error_description.as_deref().unwrap_or(error);
            warn!(provider, user_id = %user_id, error = %detail, "Provider denied authorization");
            return Err(OAuthError::Denied(detail.to_string()));
        }
        let code = params
            .code
            .as_deref()
            .ok_or_else(|| OAuthError::Denied("callback carried no code".into()))?;

        let token = p.exchange_code(code, &self.redirect_uri(provider)).await?;
        let profile = p.fetch_profile(&token).await?;
        info!(provider, user_id = %user_id, account = %profile.id, "OAuth flow completed");
        Ok(CompletedAuth { user_id, profile })
    }
}

/// Mark `provider` connected for `user_id`, storing the profile URL when the
/// provider returned one.
pub async fn record_connection(
    db: &dyn Database,
    user_id: Uuid,
    provider: &str,
    profile_url: Option<&str>,
) -> Result<SocialLinks, DatabaseError> {
    db.set_connection(user_id, provider, true, profile_url).await
}

/// Clear the connected flag. The stored URL is kept.
pub async fn disconnect(
    db: &dyn Database,
    user_id: Uuid,
    provider: &str,
) -> Result<SocialLinks, DatabaseError> {
    db.set_connection(user_id, provider, false, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::seeded;

    /// Accepts any code and returns a fixed profile.
    struct StubProvider;

    #[async_trait]
    impl OAuthProvider for StubProvider {
        fn name(&self) -> &str {
            "dribbble"
        }

        fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<String, OAuthError> {
            Ok(format!("https://provider.test/authorize?state={state}&redirect_uri={redirect_uri}"))
        }

        async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<String, OAuthError> {
            Ok(format!("token-for-{code}"))
        }

        async fn fetch_profile(&self, _access_token: &str) -> Result<ProviderProfile, OAuthError> {
            Ok(ProviderProfile {
                provider: "dribbble".into(),
                id: "42".into(),
                name: Some("Grace".into()),
                username: Some("grace".into()),
                image: None,
                bio: None,
                location: None,
                profile_url: Some("https://dribbble.com/grace".into()),
            })
        }
    }

    fn service() -> OAuthService {
        OAuthService::new("http://localhost:3000/").with_provider(Arc::new(StubProvider))
    }

    fn state_of(url: &str) -> String {
        let url = reqwest::Url::parse(url).unwrap();
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn round_trip_returns_profile_for_user() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let url = svc.initiate_auth("dribbble", user_id).unwrap();
        assert!(url.contains("redirect_uri=http://localhost:3000/api/oauth/dribbble/callback"));

        let params = CallbackParams {
            code: Some("abc".into()),
            state: Some(state_of(&url)),
            ..Default::default()
        };
        let done = svc.complete_auth("dribbble", &params).await.unwrap();
        assert_eq!(done.user_id, user_id);
        assert_eq!(done.profile.username.as_deref(), Some("grace"));

        // Replaying the callback fails.
        assert!(matches!(
            svc.complete_auth("dribbble", &params).await,
            Err(OAuthError::InvalidState)
        ));
    }

    #[tokio::test]
    async fn provider_error_is_denied() {
        let svc = service();
        let url = svc.initiate_auth("dribbble", Uuid::new_v4()).unwrap();
        let params = CallbackParams {
            state: Some(state_of(&url)),
            error: Some("access_denied".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.complete_auth("dribbble", &params).await,
            Err(OAuthError::Denied(_))
        ));
    }

    #[test]
    fn unknown_and_unconfigured_providers() {
        let svc = OAuthService::new("http://localhost:3000");
        assert!(matches!(
            svc.initiate_auth("dribbble", Uuid::new_v4()),
            Err(OAuthError::NotConfigured(_))
        ));
        assert!(matches!(
            svc.initiate_auth("myspace", Uuid::new_v4()),
            Err(OAuthError::UnsupportedProvider(_))
        ));
    }

    #[tokio::test]
    async fn connect_then_disconnect_keeps_url() {
        let (db, user_id) = seeded().await;
        let links = record_connection(&db, user_id, "dribbble", Some("https://dribbble.com/grace"))
            .await
            .unwrap();
        assert!(links.dribbble_connected);

        let links = disconnect(&db, user_id, "dribbble").await.unwrap();
        assert!(!links.dribbble_connected);
        assert_eq!(links.dribbble_url.as_deref(), Some("https://dribbble.com/grace"));
    }
}
