// src/auth.rs
//! Access-token supply.
//!
//! The core only needs an access token; where it comes from is behind
//! [`TokenProvider`]. The provided implementation prefers `NOTION_TOKEN`,
//! then the stored token, refreshing a stored OAuth token when it is about
//! to expire.

use crate::config::{ConfigFile, ConfigStore, StoredToken};
use crate::constants::NOTION_OAUTH_TOKEN_URL;
use crate::error::{AppError, NotionErrorCode, REAUTHENTICATE_HINT};
use serde::Deserialize;

/// Supplies a currently valid access token.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, AppError>;
}

/// A fixed token, such as an internal integration secret.
pub struct StaticToken(pub String);

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, AppError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Client credentials
// ---------------------------------------------------------------------------

/// Where the OAuth client credentials were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsSource {
    Env,
    Config,
}

impl CredentialsSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Env => "from env",
            Self::Config => "from config",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub source: CredentialsSource,
}

impl ClientCredentials {
    /// `NOTION_CLIENT_ID`/`NOTION_CLIENT_SECRET` when both are set,
    /// otherwise the pair from the config file.
    pub fn resolve(config: &ConfigFile) -> Option<Self> {
        Self::from_sources(
            non_empty_env("NOTION_CLIENT_ID"),
            non_empty_env("NOTION_CLIENT_SECRET"),
            config,
        )
    }

    fn from_sources(
        env_id: Option<String>,
        env_secret: Option<String>,
        config: &ConfigFile,
    ) -> Option<Self> {
        if let (Some(client_id), Some(client_secret)) = (env_id, env_secret) {
            return Some(Self {
                client_id,
                client_secret,
                source: CredentialsSource::Env,
            });
        }
        match (&config.client_id, &config.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some(Self {
                client_id: id.clone(),
                client_secret: secret.clone(),
                source: CredentialsSource::Config,
            }),
            _ => None,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

// ---------------------------------------------------------------------------
// Stored token provider
// ---------------------------------------------------------------------------

/// Tokens from `NOTION_TOKEN` or the config file.
pub struct StoredTokenProvider {
    store: ConfigStore,
    env_token: Option<String>,
    http: reqwest::Client,
    token_url: String,
}

/// Response of the OAuth token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    workspace_id: Option<String>,
    #[serde(default)]
    workspace_name: Option<String>,
}

impl StoredTokenProvider {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            env_token: non_empty_env("NOTION_TOKEN"),
            http: reqwest::Client::new(),
            token_url: NOTION_OAUTH_TOKEN_URL.to_string(),
        }
    }

    /// Overrides the environment token.
    pub fn with_env_token(mut self, token: Option<String>) -> Self {
        self.env_token = token;
        self
    }

    /// Overrides the OAuth token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        config: &ConfigFile,
    ) -> Result<StoredToken, AppError> {
        let credentials = ClientCredentials::resolve(config).ok_or_else(|| {
            AppError::MissingConfiguration(
                "Stored token has expired and client credentials are not configured. \
                 Run: noon config --client-id <id> --client-secret <secret>"
                    .to_string(),
            )
        })?;

        log::info!("Access token expired, refreshing");
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .json(&serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": refresh_token,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let mut message = format!("Token refresh failed ({}): {}", status, body);
            if NotionErrorCode::from_http_status(status.as_u16()).is_auth_failure() {
                message = format!("{}. {}", message, REAUTHENTICATE_HINT);
            }
            return Err(AppError::MissingConfiguration(message));
        }

        let refreshed: TokenResponse = serde_json::from_str(&body)?;
        let token = StoredToken {
            access_token: refreshed.access_token,
            refresh_token: refreshed
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expires_at: refreshed
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp_millis() + secs * 1000),
            workspace_id: refreshed.workspace_id,
            workspace_name: refreshed.workspace_name,
        };

        let saved = token.clone();
        self.store.update(move |config| config.token = Some(saved)).await?;
        Ok(token)
    }
}

#[async_trait::async_trait]
impl TokenProvider for StoredTokenProvider {
    async fn access_token(&self) -> Result<String, AppError> {
        if let Some(token) = &self.env_token {
            log::debug!("Using access token from NOTION_TOKEN");
            return Ok(token.clone());
        }

        let config = self.store.load().await;
        let token = config.token.clone().ok_or_else(|| {
            AppError::MissingConfiguration(
                "Not authenticated. Run `noon auth --token <token>` or set NOTION_TOKEN"
                    .to_string(),
            )
        })?;

        if !token.is_expired() {
            return Ok(token.access_token);
        }

        match token.refresh_token.as_deref() {
            Some(refresh_token) => Ok(self.refresh(refresh_token, &config).await?.access_token),
            None => {
                log::warn!("Stored token has expired and has no refresh token; using it anyway");
                Ok(token.access_token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_with_credentials() -> ConfigFile {
        ConfigFile {
            client_id: Some("cfg-id".to_string()),
            client_secret: Some("cfg-secret".to_string()),
            token: None,
        }
    }

    #[test]
    fn test_env_credentials_take_precedence() {
        let creds = ClientCredentials::from_sources(
            Some("env-id".to_string()),
            Some("env-secret".to_string()),
            &config_with_credentials(),
        )
        .unwrap();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.source, CredentialsSource::Env);
    }

    #[test]
    fn test_partial_env_falls_back_to_config() {
        let creds = ClientCredentials::from_sources(
            Some("env-id".to_string()),
            None,
            &config_with_credentials(),
        )
        .unwrap();
        assert_eq!(creds.client_id, "cfg-id");
        assert_eq!(creds.source, CredentialsSource::Config);
    }

    #[test]
    fn test_no_credentials() {
        assert_eq!(
            ClientCredentials::from_sources(None, None, &ConfigFile::default()),
            None
        );
    }

    #[tokio::test]
    async fn test_env_token_wins_over_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        store
            .update(|config| config.token = Some(StoredToken::new("stored")))
            .await
            .unwrap();

        let provider = StoredTokenProvider::new(store.clone()).with_env_token(Some("env".into()));
        assert_eq!(provider.access_token().await.unwrap(), "env");

        let provider = StoredTokenProvider::new(store).with_env_token(None);
        assert_eq!(provider.access_token().await.unwrap(), "stored");
    }

    #[tokio::test]
    async fn test_missing_token_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = StoredTokenProvider::new(ConfigStore::new(dir.path().join("config.json")))
            .with_env_token(None);
        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, AppError::MissingConfiguration(_)));
        assert!(err.to_string().contains("noon auth --token"));
    }

    #[tokio::test]
    async fn test_rejected_refresh_suggests_reauthenticating() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let body = r#"{"error":"invalid_grant"}"#;
            let response = format!(
                "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        store
            .update(|config| {
                *config = config_with_credentials();
                config.token = Some(StoredToken {
                    expires_at: Some(0),
                    refresh_token: Some("refresh".to_string()),
                    ..StoredToken::new("expired")
                });
            })
            .await
            .unwrap();

        let provider = StoredTokenProvider::new(store)
            .with_env_token(None)
            .with_token_url(format!("http://{}/v1/oauth/token", address));
        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, AppError::MissingConfiguration(_)));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().ends_with(REAUTHENTICATE_HINT));
    }
}
