//! Google sources (Gmail and Google Tasks) and their shared OAuth2 client
//!
//! ## Authentication
//!
//! Uses an installed-app OAuth2 client. The client credentials JSON is the
//! file downloaded from the Google Cloud console; the user token is kept
//! next to it and refreshed in place.
//!
//! When no token is stored, the consent URL is printed and the
//! authorization code is read from the terminal.

mod mail;
mod tasks;

pub use mail::GmailSource;
pub use tasks::GoogleTasksSource;

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::http::fetch_json;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Read-only scopes for mail and tasks
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/tasks.readonly",
];

fn default_auth_uri() -> String {
    AUTH_URL.to_string()
}

fn default_token_uri() -> String {
    TOKEN_URL.to_string()
}

/// OAuth2 client credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Credentials file as downloaded from the console
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientCredentials>,
    web: Option<ClientCredentials>,
}

/// Persisted user token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Whether the access token is usable for at least five more minutes
    ///
    /// A missing or zero expiry never expires.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) if expiry.timestamp() > 0 => now < expiry - Duration::minutes(5),
            _ => true,
        }
    }

    fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_stored(self, previous_refresh: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expiry: self
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Asks the user for an authorization code
pub trait AuthorizationPrompt: Send + Sync {
    /// Show `consent_url` and return the code the user pastes back
    fn authorization_code(&self, consent_url: &str) -> std::io::Result<String>;
}

/// Prompt on the terminal, reading the code from stdin
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl AuthorizationPrompt for StdinPrompt {
    fn authorization_code(&self, consent_url: &str) -> std::io::Result<String> {
        let mut stderr = std::io::stderr();
        writeln!(
            stderr,
            "Go to the following link in your browser then type the authorization code:\n{consent_url}"
        )?;
        write!(stderr, "Code: ")?;
        stderr.flush()?;

        let mut code = String::new();
        std::io::stdin().read_line(&mut code)?;
        Ok(code.trim().to_string())
    }
}

/// Google OAuth2 client shared by the Gmail and Tasks sources
pub struct GoogleAuth {
    /// HTTP client
    client: Client,

    /// OAuth2 client credentials
    credentials: ClientCredentials,

    /// Where the user token is persisted
    token_path: PathBuf,

    /// Token cache with interior mutability
    token_cache: RwLock<Option<StoredToken>>,

    /// Interactive fallback when no token is stored
    prompt: Box<dyn AuthorizationPrompt>,
}

impl GoogleAuth {
    /// Load client credentials; the token is read lazily on first use
    pub fn from_files(
        client: Client,
        credentials_path: &Path,
        token_path: impl Into<PathBuf>,
    ) -> FetchResult<Self> {
        let content = std::fs::read_to_string(credentials_path).map_err(|e| {
            FetchError::Auth(format!(
                "failed to read client credentials {}: {}",
                credentials_path.display(),
                e
            ))
        })?;

        let file: CredentialsFile = serde_json::from_str(&content)
            .map_err(|e| FetchError::Auth(format!("invalid client credentials: {e}")))?;

        let credentials = file.installed.or(file.web).ok_or_else(|| {
            FetchError::Auth("client credentials have no 'installed' or 'web' section".to_string())
        })?;

        Ok(Self {
            client,
            credentials,
            token_path: token_path.into(),
            token_cache: RwLock::new(None),
            prompt: Box::new(StdinPrompt),
        })
    }

    /// Replace the interactive prompt
    pub fn with_prompt(mut self, prompt: impl AuthorizationPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Consent page URL for the offline, out-of-band flow
    pub fn consent_url(&self) -> FetchResult<Url> {
        let scope = SCOPES.join(" ");
        Ok(Url::parse_with_params(
            &self.credentials.auth_uri,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", OOB_REDIRECT_URI),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("state", "state-token"),
            ],
        )?)
    }

    /// Get or refresh the user's access token
    pub async fn access_token(&self) -> FetchResult<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(token) = &*cache {
                if token.is_fresh(Utc::now()) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cache = self.token_cache.write().await;
        if cache.is_none() {
            *cache = self.load_token()?;
        }

        if let Some(token) = &*cache {
            if token.is_fresh(Utc::now()) {
                debug!("using stored google token");
                return Ok(token.access_token.clone());
            }
        }

        let refreshed = match (*cache).as_ref().and_then(StoredToken::refresh_token) {
            Some(refresh_token) => self.refresh(refresh_token).await?,
            None => self.authorize().await?,
        };

        self.save_token(&refreshed)?;
        let access_token = refreshed.access_token.clone();
        *cache = Some(refreshed);
        Ok(access_token)
    }

    /// GET a Google API resource with the user's bearer token
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        let token = self.access_token().await?;
        debug!("Making GET request to {}", url.path());
        fetch_json(self.client.get(url).bearer_auth(token)).await
    }

    async fn refresh(&self, refresh_token: &str) -> FetchResult<StoredToken> {
        info!("refreshing google access token");
        let response: TokenResponse = self
            .token_request(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        Ok(response.into_stored(Some(refresh_token)))
    }

    async fn authorize(&self) -> FetchResult<StoredToken> {
        let consent_url = self.consent_url()?;
        let code = self.prompt.authorization_code(consent_url.as_str())?;
        if code.is_empty() {
            return Err(FetchError::Auth("no authorization code entered".to_string()));
        }

        info!("exchanging authorization code for google token");
        let response: TokenResponse = self
            .token_request(&[
                ("code", code.as_str()),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("redirect_uri", OOB_REDIRECT_URI),
                ("grant_type", "authorization_code"),
            ])
            .await?;
        Ok(response.into_stored(None))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> FetchResult<TokenResponse> {
        let request = self.client.post(&self.credentials.token_uri).form(form);
        match fetch_json(request).await {
            Err(FetchError::Api { status, message }) => Err(FetchError::Auth(format!(
                "token endpoint returned {status}: {message}"
            ))),
            other => other,
        }
    }

    fn load_token(&self) -> FetchResult<Option<StoredToken>> {
        let content = match std::fs::read_to_string(&self.token_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let token = serde_json::from_str(&content).map_err(|e| {
            FetchError::Auth(format!(
                "invalid token file {}: {}",
                self.token_path.display(),
                e
            ))
        })?;
        Ok(Some(token))
    }

    fn save_token(&self, token: &StoredToken) -> FetchResult<()> {
        info!(path = %self.token_path.display(), "saving google token");
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.token_path)?;
        file.write_all(&serde_json::to_vec(token)?)?;
        Ok(())
    }
}
