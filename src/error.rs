// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types shared by the authentication, fetch and storage layers

use std::time::Duration;

/// Every fatal condition a report run can hit
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} is not set. Please set STRAVA_CLIENT_ID and STRAVA_CLIENT_SECRET in your .env file")]
    ConfigurationMissing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidConfiguration { name: &'static str, value: String },

    #[error("Authorization failed: {0}")]
    AuthorizationDenied(String),

    #[error("No authorization callback received within {0:?}")]
    AuthorizationTimeout(Duration),

    #[error("Failed to get access token: {0}")]
    TokenExchangeFailed(String),

    #[error("Failed to fetch activities: {0}")]
    FetchFailed(String),

    #[error("Callback listener failed: {0}")]
    CallbackListener(#[source] std::io::Error),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Token serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, AppError>;
