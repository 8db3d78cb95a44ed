use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::db::StoreError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/firebase.database https://www.googleapis.com/auth/userinfo.email";

/// Fields of a Google service-account key file that the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Credential(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Credential(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges a signed service-account assertion for OAuth access tokens and
/// reuses each token until a minute before it expires.
pub struct ServiceAccountAuth {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Result<Self, StoreError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StoreError::Credential(format!("invalid private key: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    pub async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() + Duration::seconds(60) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.exchange().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn exchange(&self) -> Result<CachedToken, StoreError> {
        let now = Utc::now();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {}", e)))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token exchange failed {}: {}", status, text)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        info!("Obtained access token for {}", self.key.client_email);

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: token_expiry(now, token.expires_in),
        })
    }
}

/// Lifetime used when the endpoint reports one that is not a usable positive duration.
const FALLBACK_TOKEN_LIFETIME_SECS: i64 = 3600;

fn token_expiry(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let fallback = Duration::seconds(FALLBACK_TOKEN_LIFETIME_SECS);
    let lifetime = Duration::try_seconds(expires_in)
        .filter(|d| *d > Duration::zero())
        .unwrap_or(fallback);
    now.checked_add_signed(lifetime)
        .or_else(|| now.checked_add_signed(fallback))
        .unwrap_or(now)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_lifetime_is_used() {
        let now = Utc::now();
        assert_eq!(token_expiry(now, 120), now + Duration::seconds(120));
    }

    #[test]
    fn unusable_lifetimes_fall_back_to_an_hour() {
        let now = Utc::now();
        let hour = now + Duration::seconds(3600);
        assert_eq!(token_expiry(now, i64::MAX), hour);
        assert_eq!(token_expiry(now, i64::MAX / 1000), hour);
        assert_eq!(token_expiry(now, 0), hour);
        assert_eq!(token_expiry(now, -5), hour);
    }
}
