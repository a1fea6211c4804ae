// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Endpoints, environment variable names and defaults used across the crate.

/// API endpoints and URLs
pub mod endpoints {
    /// Strava API
    pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
    pub const STRAVA_AUTH_URL: &str = "https://www.strava.com/oauth/authorize";
    pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

    /// Paths relative to the API base
    pub const ATHLETE_PATH: &str = "/athlete";
    pub const ACTIVITIES_PATH: &str = "/athlete/activities";
}

/// Environment variable names
pub mod env_config {
    pub const CLIENT_ID: &str = "STRAVA_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "STRAVA_CLIENT_SECRET";
    pub const TOKEN_FILE: &str = "STRAVA_TOKEN_FILE";
    pub const CALLBACK_PORT: &str = "STRAVA_CALLBACK_PORT";
    pub const CALLBACK_TIMEOUT_SECS: &str = "STRAVA_CALLBACK_TIMEOUT_SECS";
    pub const PAGE_SIZE: &str = "STRAVA_PAGE_SIZE";
    pub const API_BASE: &str = "STRAVA_API_BASE";
    pub const AUTH_URL: &str = "STRAVA_AUTH_URL";
    pub const TOKEN_URL: &str = "STRAVA_TOKEN_URL";
}

/// OAuth callback routing
pub mod routes {
    pub const OAUTH_CALLBACK: &str = "/callback";
}

/// OAuth scopes
pub mod oauth {
    /// Scopes needed to read every activity, private ones included
    pub const STRAVA_DEFAULT_SCOPES: &str = "read,activity:read_all";
}

/// Numeric limits and unit conversions
pub mod limits {
    /// Largest page Strava serves for the activities listing
    pub const DEFAULT_PAGE_SIZE: u32 = 200;

    /// Must match the port of the redirect URI registered with Strava
    pub const DEFAULT_CALLBACK_PORT: u16 = 8000;

    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    pub const MINUTES_PER_HOUR: f64 = 60.0;
    pub const METERS_PER_KILOMETER: f64 = 1000.0;
}

/// File defaults
pub mod defaults {
    pub const TOKEN_FILE: &str = "strava_token.json";
}
