//! Service-account authentication for the Drive API.
//!
//! Signs an RS256 JWT with the account's private key and exchanges it for a
//! short-lived bearer token at the key's `token_uri`.

use crate::error::{NotewiseError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a Google service-account JSON key that authentication needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse a service-account key file's content.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Whether a token expiring at `expires_at` is too close to expiry to reuse at `now`.
fn needs_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now
}

/// Issues bearer tokens for a service account, reusing one until it nears expiry.
pub struct TokenProvider {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    http: reqwest::Client,
    current: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, scopes: Vec<String>, http: reqwest::Client) -> Self {
        Self {
            key,
            scopes,
            http,
            current: Mutex::new(None),
        }
    }

    /// Return a valid access token, exchanging a new assertion when needed.
    pub async fn token(&self) -> Result<String> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if !needs_refresh(token.expires_at, Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *current = Some(fresh);
        Ok(value)
    }

    fn claims(&self, now: DateTime<Utc>) -> Claims {
        let iat = now.timestamp();
        Claims {
            iss: self.key.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes()).map_err(|e| {
            NotewiseError::Download(format!("Invalid service account private key: {}", e))
        })?;

        encode(&Header::new(Algorithm::RS256), claims, &key)
            .map_err(|e| NotewiseError::Download(format!("Failed to sign assertion: {}", e)))
    }

    #[instrument(skip(self), fields(account = %self.key.client_email))]
    async fn exchange(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = self.sign(&self.claims(now))?;

        debug!("Requesting Drive access token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| NotewiseError::Download(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotewiseError::Download(format!(
                "Drive authentication failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| NotewiseError::Download(format!("Invalid token response: {}", e)))?;

        Ok(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
