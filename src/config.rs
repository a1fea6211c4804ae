// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the weekly report

use crate::constants::{defaults, endpoints, env_config, limits, oauth, routes};
use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a report run needs to talk to Strava
#[derive(Debug, Clone)]
pub struct StravaConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Where the credential JSON is persisted
    pub token_file: PathBuf,
    /// Local port of the OAuth redirect listener
    pub callback_port: u16,
    /// `None` waits for the browser redirect forever
    pub callback_timeout: Option<Duration>,
    pub page_size: u32,
    pub api_base: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl StravaConfig {
    /// Configuration with Strava's production endpoints and default limits
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_file: PathBuf::from(defaults::TOKEN_FILE),
            callback_port: limits::DEFAULT_CALLBACK_PORT,
            callback_timeout: None,
            page_size: limits::DEFAULT_PAGE_SIZE,
            api_base: endpoints::STRAVA_API_BASE.to_string(),
            auth_url: endpoints::STRAVA_AUTH_URL.to_string(),
            token_url: endpoints::STRAVA_TOKEN_URL.to_string(),
            scopes: parse_scopes(oauth::STRAVA_DEFAULT_SCOPES),
        }
    }

    /// Load configuration from the process environment
    ///
    /// Call [`load_dotenv`] beforehand for `.env` values to be visible.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// Client credentials are checked before anything else so a missing
    /// secret is reported before any network activity.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = required(&lookup, env_config::CLIENT_ID)?;
        let client_secret = required(&lookup, env_config::CLIENT_SECRET)?;

        let mut config = Self::new(client_id, client_secret);

        if let Some(path) = lookup(env_config::TOKEN_FILE) {
            config.token_file = PathBuf::from(path);
        }
        if let Some(port) = parsed(&lookup, env_config::CALLBACK_PORT)? {
            config.callback_port = port;
        }
        if let Some(secs) = parsed::<u64, _>(&lookup, env_config::CALLBACK_TIMEOUT_SECS)? {
            config.callback_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(page_size) = parsed::<u32, _>(&lookup, env_config::PAGE_SIZE)? {
            config.set_page_size(page_size, env_config::PAGE_SIZE)?;
        }
        if let Some(api_base) = lookup(env_config::API_BASE) {
            config.api_base = api_base.trim_end_matches('/').to_string();
        }
        if let Some(auth_url) = lookup(env_config::AUTH_URL) {
            config.auth_url = auth_url;
        }
        if let Some(token_url) = lookup(env_config::TOKEN_URL) {
            config.token_url = token_url;
        }

        info!(
            token_file = %config.token_file.display(),
            callback_port = config.callback_port,
            page_size = config.page_size,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Override the page size; `source` names the setting in the error when
    /// the value is rejected
    pub fn set_page_size(&mut self, page_size: u32, source: &'static str) -> Result<()> {
        if page_size == 0 {
            return Err(AppError::InvalidConfiguration {
                name: source,
                value: page_size.to_string(),
            });
        }
        self.page_size = page_size;
        Ok(())
    }

    /// Redirect URI registered with Strava; must match character for character
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}{}", self.callback_port, routes::OAUTH_CALLBACK)
    }
}

/// Read `.env` from the working directory or its parents into the process
/// environment; variables already set keep their values
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(AppError::ConfigurationMissing(name))
}

fn parsed<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidConfiguration { name, value }),
    }
}

fn parse_scopes(scopes: &str) -> Vec<String> {
    scopes
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
