// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Token Authenticator
//!
//! Decides whether the saved credential can be reused, refreshed, or whether
//! the user has to authorize again in the browser:
//!
//! 1. No saved credential: authorize.
//! 2. Saved credential validates against the athlete endpoint: reuse it.
//! 3. Validation says unauthorized and a refresh token exists: refresh once;
//!    if that fails, authorize.
//! 4. Any other validation failure: authorize.
//!
//! Every new credential is persisted before its access token is handed out.

use crate::callback::{CallbackListener, CallbackOutcome};
use crate::config::StravaConfig;
use crate::error::{AppError, Result};
use crate::logging::AppLogger;
use crate::oauth2_client::{Credential, OAuth2Client, OAuth2Config};
use crate::providers::strava::StravaProvider;
use crate::providers::{ActivitySource, TokenCheck};
use crate::token_store::TokenStore;
use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{info, warn};

/// Opens a URL for the user to visit
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Launches the platform's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", ""]);
            command
        } else {
            Command::new("xdg-open")
        };

        command
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NoCredential,
    HasValidCredential,
    HasExpiredCredential,
    AwaitingAuthorization,
}

pub struct TokenAuthenticator<B: BrowserLauncher = SystemBrowser> {
    oauth: OAuth2Client,
    store: TokenStore,
    provider: StravaProvider,
    callback_port: u16,
    callback_timeout: Option<Duration>,
    browser: B,
    state: AuthState,
}

impl<B: BrowserLauncher> TokenAuthenticator<B> {
    pub fn with_browser(config: &StravaConfig, browser: B) -> Self {
        Self {
            oauth: OAuth2Client::new(OAuth2Config::from(config)),
            store: TokenStore::new(&config.token_file),
            provider: StravaProvider::new(config),
            callback_port: config.callback_port,
            callback_timeout: config.callback_timeout,
            browser,
            state: AuthState::NoCredential,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// A working access token, reusing, refreshing or re-authorizing as needed
    pub async fn obtain_access_token(&mut self) -> Result<String> {
        self.state = AuthState::NoCredential;

        if let Some(saved) = self.store.load() {
            if let Some(expires_at) = saved.expires_at() {
                info!(%expires_at, expired = saved.is_expired(), "Found saved access token");
            }

            match self.provider.check_token(&saved.access_token).await {
                TokenCheck::Valid => {
                    info!("Using saved access token...");
                    self.state = AuthState::HasValidCredential;
                    return Ok(saved.access_token);
                }
                TokenCheck::Unauthorized => match saved.refresh_token() {
                    Some(refresh_token) => {
                        info!("Access token expired, trying to refresh...");
                        self.state = AuthState::HasExpiredCredential;
                        if let Some(credential) = self.try_refresh(refresh_token).await {
                            return Ok(credential.access_token);
                        }
                    }
                    None => warn!("Saved access token rejected and no refresh token available"),
                },
                TokenCheck::Failed(reason) => {
                    warn!(%reason, "Could not validate saved access token");
                }
            }
        }

        info!("Need fresh authorization...");
        let credential = self.authorize().await?;
        Ok(credential.access_token)
    }

    /// Single refresh attempt; `None` sends the caller to fresh authorization
    async fn try_refresh(&self, refresh_token: &str) -> Option<Credential> {
        let credential = match self.oauth.refresh_token(refresh_token).await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                AppLogger::log_oauth_event("refresh", false);
                return None;
            }
        };

        if let Err(e) = self.store.save(&credential) {
            warn!(error = %e, "Refreshed token could not be saved");
            AppLogger::log_oauth_event("refresh", false);
            return None;
        }

        AppLogger::log_oauth_event("refresh", true);
        Some(credential)
    }

    async fn authorize(&mut self) -> Result<Credential> {
        self.state = AuthState::AwaitingAuthorization;

        let auth_url = self.oauth.get_authorization_url()?;
        let listener = CallbackListener::bind(self.callback_port).await?;

        eprintln!("Opening browser for authorization: {}", auth_url);
        if let Err(e) = self.browser.open(&auth_url) {
            warn!(error = %e, "Could not open a browser, visit the URL above manually");
        }

        info!("Waiting for authorization callback on {}...", self.oauth.redirect_uri());
        let outcome = match self.callback_timeout {
            Some(limit) => tokio::time::timeout(limit, listener.wait_for_callback())
                .await
                .map_err(|_| AppError::AuthorizationTimeout(limit))??,
            None => listener.wait_for_callback().await?,
        };

        let code = match outcome {
            CallbackOutcome::Code(code) => code,
            CallbackOutcome::Denied(reason) => {
                AppLogger::log_oauth_event("authorize", false);
                return Err(AppError::AuthorizationDenied(
                    reason.unwrap_or_else(|| "no authorization code in callback".to_string()),
                ));
            }
        };

        info!("Received authorization code, exchanging for tokens...");
        let credential = self.oauth.exchange_code(&code).await.inspect_err(|_| {
            AppLogger::log_oauth_event("exchange_code", false);
        })?;
        self.store.save(&credential)?;
        AppLogger::log_oauth_event("exchange_code", true);

        Ok(credential)
    }
}
