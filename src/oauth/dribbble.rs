//! Dribbble OAuth provider.

use async_trait::async_trait;
use reqwest::Url;
use secrecy::ExposeSecret;
use serde::Deserialize;

use super::{OAuthProvider, ProviderProfile};
use crate::config::OAuthConfig;
use crate::error::OAuthError;

const NAME: &str = "dribbble";
const AUTHORIZE_URL: &str = "https://dribbble.com/oauth/authorize";
const TOKEN_URL: &str = "https://dribbble.com/oauth/token";
const USER_URL: &str = "https://api.dribbble.com/v2/user";
const SCOPE: &str = "public";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DribbbleUser {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

pub struct DribbbleProvider {
    config: OAuthConfig,
    authorize_url: String,
    token_url: String,
    user_url: String,
    client: reqwest::Client,
}

impl DribbbleProvider {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            user_url: USER_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the token and user-info calls somewhere else.
    pub fn with_api_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_url = format!("{base}/oauth/token");
        self.user_url = format!("{base}/v2/user");
        self
    }

    fn request_failed(e: impl std::fmt::Display) -> OAuthError {
        OAuthError::RequestFailed {
            provider: NAME.into(),
            reason: e.to_string(),
        }
    }

    fn invalid_response(e: impl std::fmt::Display) -> OAuthError {
        OAuthError::InvalidResponse {
            provider: NAME.into(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl OAuthProvider for DribbbleProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn authorize_url(&self, state: &str, redirect_uri: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", SCOPE),
                ("state", state),
                ("response_type", "code"),
            ],
        )
        .map_err(Self::invalid_response)?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, OAuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(Self::request_failed)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::request_failed(format!("token exchange {status}: {body}")));
        }

        let token: TokenResponse = resp.json().await.map_err(Self::invalid_response)?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let resp = self
            .client
            .get(&self.user_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::request_failed)?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Self::request_failed(format!("user info {status}")));
        }

        let user: DribbbleUser = resp.json().await.map_err(Self::invalid_response)?;
        Ok(ProviderProfile {
            provider: NAME.to_string(),
            id: user.id.to_string(),
            name: user.name,
            username: user.login,
            image: user.avatar_url,
            bio: user.bio,
            location: user.location,
            profile_url: user.html_url,
        })
    }
}
