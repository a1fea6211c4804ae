// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end run: token, fetch, aggregate

use crate::aggregation::{aggregate, WeeklySummary};
use crate::authenticator::{BrowserLauncher, TokenAuthenticator};
use crate::config::StravaConfig;
use crate::error::Result;
use crate::logging::AppLogger;
use crate::providers::strava::StravaProvider;
use crate::providers::ActivitySource;
use tracing::info;

/// Fetch every activity with `access_token` and fold it into weeks
///
/// Nothing is aggregated unless the whole fetch succeeded.
pub async fn summarize(source: &dyn ActivitySource, access_token: &str) -> Result<WeeklySummary> {
    info!("Fetching all activities...");
    let activities = source.fetch_all(access_token).await?;
    info!("Found {} total activities", activities.len());

    info!("Grouping activities by week and type...");
    let summary = aggregate(&activities);
    AppLogger::log_fetch_complete(activities.len(), summary.week_count());

    Ok(summary)
}

pub async fn run<B: BrowserLauncher>(config: &StravaConfig, browser: B) -> Result<WeeklySummary> {
    info!("Getting Strava access token...");
    let mut authenticator = TokenAuthenticator::with_browser(config, browser);
    let access_token = authenticator.obtain_access_token().await?;

    let provider = StravaProvider::new(config);
    summarize(&provider, &access_token).await
}
