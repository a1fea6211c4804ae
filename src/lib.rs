// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Strava Weekly
//!
//! Pulls your complete Strava activity history and summarizes it per ISO
//! calendar week and activity type.
//!
//! ## Features
//!
//! - **OAuth2 authorization-code flow**: browser login with a local redirect
//!   listener, token persisted to disk
//! - **Token reuse and refresh**: saved tokens are validated first and
//!   refreshed once when Strava rejects them
//! - **Full history**: every page of the activities listing is fetched
//! - **Weekly summaries**: count, moving time and distance per week and type
//!
//! ## Quick Start
//!
//! 1. Register an API application at Strava with the callback domain
//!    `localhost` and put `STRAVA_CLIENT_ID` / `STRAVA_CLIENT_SECRET` in `.env`
//! 2. Run `strava-weekly`; authorize in the browser on first use
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use strava_weekly::authenticator::SystemBrowser;
//! use strava_weekly::config::StravaConfig;
//! use strava_weekly::{pipeline, report};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StravaConfig::from_env()?;
//!     let summary = pipeline::run(&config, SystemBrowser).await?;
//!     print!("{}", report::render_table(&summary));
//!     Ok(())
//! }
//! ```

/// Weekly grouping of activities
pub mod aggregation;

/// Saved-token validation, refresh and browser authorization
pub mod authenticator;

/// OAuth redirect listener
pub mod callback;

/// Configuration loading
pub mod config;

/// Application constants
pub mod constants;

/// Error types
pub mod error;

/// Structured logging setup
pub mod logging;

/// Common data models
pub mod models;

/// Token endpoint client and credential model
pub mod oauth2_client;

/// Fetch, aggregate and report orchestration
pub mod pipeline;

/// Strava API access
pub mod providers;

/// Console and JSON rendering
pub mod report;

/// Credential persistence
pub mod token_store;
