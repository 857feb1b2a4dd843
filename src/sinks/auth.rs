use crate::error::SinkError;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Fields of a Google service-account JSON key that the token exchange needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, SinkError> {
        serde_json::from_str(json)
            .map_err(|e| SinkError::Auth(format!("malformed service-account key: {e}")))
    }

    pub async fn from_file(path: &Path) -> Result<Self, SinkError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            SinkError::Auth(format!(
                "cannot read service-account key {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }

    /// Signed RS256 assertion for the JWT-bearer grant, valid for one hour
    pub fn sign_assertion(&self, scope: &str) -> Result<String, SinkError> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| SinkError::Auth(format!("invalid private key: {e}")))?;

        encode(&header, &claims, &key)
            .map_err(|e| SinkError::Auth(format!("failed to sign assertion: {e}")))
    }

    /// Exchange a signed assertion for a bearer access token.
    pub async fn fetch_access_token(&self, client: &Client, scope: &str) -> Result<String, SinkError> {
        let assertion = self.sign_assertion(scope)?;

        debug!("Requesting access token for {}", self.client_email);

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SinkError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SinkError::Auth(format!("unexpected token response: {e}")))?;

        Ok(token.access_token)
    }
}

#[derive(Debug, Serialize)]
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
}
