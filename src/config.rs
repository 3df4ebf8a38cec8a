//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// libSQL database file.
    pub db_path: PathBuf,
    /// Public base URL, used for OAuth redirect URIs and follow-up links.
    pub public_url: String,
    /// Directory for rolling log files (stderr only when unset).
    pub log_dir: Option<PathBuf>,
    /// Dribbble OAuth credentials, if configured.
    pub dribbble: Option<OAuthConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: PathBuf::from("./data/sewna.db"),
            public_url: "http://localhost:3000".to_string(),
            log_dir: None,
            dribbble: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from `SEWNA_*` and provider environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("SEWNA_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "SEWNA_PORT".to_string(),
                message: e.to_string(),
            })?,
            Err(_) => defaults.port,
        };

        let db_path = std::env::var("SEWNA_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let public_url = std::env::var("SEWNA_PUBLIC_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_url);

        let log_dir = std::env::var("SEWNA_LOG_DIR").ok().map(PathBuf::from);

        Ok(Self {
            port,
            db_path,
            public_url,
            log_dir,
            dribbble: OAuthConfig::from_env("DRIBBBLE")?,
        })
    }
}

/// OAuth client credentials for one provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl OAuthConfig {
    /// Read `<PREFIX>_CLIENT_ID` / `<PREFIX>_CLIENT_SECRET`.
    ///
    /// Returns `None` when neither is set; only one of the pair is an error.
    pub fn from_env(prefix: &str) -> Result<Option<Self>, ConfigError> {
        let id_key = format!("{prefix}_CLIENT_ID");
        let secret_key = format!("{prefix}_CLIENT_SECRET");
        let (client_id, client_secret) = match (std::env::var(&id_key), std::env::var(&secret_key)) {
            (Ok(id), Ok(secret)) => (id, secret),
            (Err(_), Err(_)) => return Ok(None),
            (Ok(_), Err(_)) => {
                return Err(ConfigError::MissingRequired {
                    key: secret_key,
                    hint: format!("{id_key} is set, so the matching secret is required."),
                });
            }
            (Err(_), Ok(_)) => {
                return Err(ConfigError::MissingRequired {
                    key: id_key,
                    hint: format!("{secret_key} is set, so the matching client id is required."),
                });
            }
        };
        Ok(Some(Self {
            client_id,
            client_secret: SecretString::from(client_secret),
        }))
    }
}
