// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::config::StravaConfig;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl From<&StravaConfig> for OAuth2Config {
    fn from(config: &StravaConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri(),
            scopes: config.scopes.clone(),
        }
    }
}

/// Token payload as issued by the provider
///
/// Only `access_token` is required. Everything else, `refresh_token` and
/// `expires_at` included, stays in `extra` exactly as received so the
/// persisted file mirrors the provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// `None` when absent, null or empty
    pub fn refresh_token(&self) -> Option<&str> {
        self.extra
            .get("refresh_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Unix timestamp in seconds; unreadable values count as unknown
    pub fn expires_at_secs(&self) -> Option<i64> {
        match self.extra.get("expires_at")? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|seconds| seconds as i64)),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at_secs()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at()
            .map(|expires_at| expires_at <= Utc::now())
            .unwrap_or(false)
    }
}

pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// URL the user visits to grant access
    ///
    /// Strava expects comma separated scopes.
    pub fn get_authorization_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(","));

        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<Credential> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        self.request_token(&params).await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Credential> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        self.request_token(&params).await
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<Credential> {
        let grant_type = params
            .iter()
            .find(|(key, _)| *key == "grant_type")
            .map(|(_, value)| *value)
            .unwrap_or_default();
        debug!(grant_type, "Requesting token");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::TokenExchangeFailed(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::TokenExchangeFailed(format!("unreadable token response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::TokenExchangeFailed(format!("{}: {}", status, body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::TokenExchangeFailed(format!("malformed token response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn test_client() -> OAuth2Client {
        let mut config = StravaConfig::new("12345", "secret");
        config.callback_port = 8000;
        OAuth2Client::new(OAuth2Config::from(&config))
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = test_client().get_authorization_url().unwrap();
        assert!(url.starts_with("https://www.strava.com/oauth/authorize?"));

        let parsed = Url::parse(&url).unwrap();
        let params: HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "12345");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["redirect_uri"], "http://localhost:8000/callback");
        assert_eq!(params["scope"], "read,activity:read_all");
        assert!(!params.contains_key("client_secret"));
    }

    #[test]
    fn test_credential_keeps_unknown_fields() {
        let payload = json!({
            "token_type": "Bearer",
            "access_token": "a1",
            "refresh_token": "r1",
            "expires_at": 1_700_000_000,
            "expires_in": 21600,
            "athlete": { "id": 42, "username": "runner" }
        });

        let credential: Credential = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(credential.access_token, "a1");
        assert_eq!(credential.refresh_token(), Some("r1"));
        assert_eq!(credential.expires_at_secs(), Some(1_700_000_000));
        assert_eq!(credential.extra["athlete"]["id"], 42);

        assert_eq!(serde_json::to_value(&credential).unwrap(), payload);
    }

    #[test]
    fn test_credential_without_refresh_token() {
        let credential: Credential = serde_json::from_value(json!({ "access_token": "a1" })).unwrap();
        assert!(credential.refresh_token().is_none());
        assert!(credential.expires_at().is_none());
        assert!(!credential.is_expired());
    }

    #[test]
    fn test_credential_expiry() {
        let credential: Credential =
            serde_json::from_value(json!({ "access_token": "a1", "expires_at": 1 })).unwrap();
        assert!(credential.is_expired());
    }

    #[test]
    fn test_credential_null_fields_round_trip() {
        let payload = json!({
            "access_token": "a1",
            "refresh_token": null,
            "expires_at": null
        });

        let credential: Credential = serde_json::from_value(payload.clone()).unwrap();
        assert!(credential.refresh_token().is_none());
        assert!(credential.expires_at().is_none());
        assert_eq!(serde_json::to_value(&credential).unwrap(), payload);
    }

    #[test]
    fn test_credential_odd_expiry_is_tolerated() {
        let fractional: Credential =
            serde_json::from_value(json!({ "access_token": "a1", "expires_at": 1.5 })).unwrap();
        assert_eq!(fractional.expires_at_secs(), Some(1));
        assert!(fractional.is_expired());

        let text: Credential =
            serde_json::from_value(json!({ "access_token": "a1", "expires_at": "1900000000" })).unwrap();
        assert_eq!(text.expires_at_secs(), Some(1_900_000_000));

        let garbage: Credential =
            serde_json::from_value(json!({ "access_token": "a1", "expires_at": "soon" })).unwrap();
        assert!(garbage.expires_at().is_none());
        assert!(!garbage.is_expired());
        assert_eq!(garbage.extra["expires_at"], "soon");
    }
}
