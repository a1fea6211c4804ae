// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::{ActivitySource, TokenCheck};
use crate::config::StravaConfig;
use crate::constants::endpoints;
use crate::error::{AppError, Result};
use crate::models::Activity;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

#[derive(Clone)]
pub struct StravaProvider {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl StravaProvider {
    pub fn new(config: &StravaConfig) -> Self {
        Self::with_base_url(config.api_base.clone(), config.page_size)
    }

    pub fn with_base_url(base_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// One page of the activities listing, in provider order
    pub async fn list_activities(&self, access_token: &str, page: u32) -> Result<Vec<Activity>> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, endpoints::ACTIVITIES_PATH))
            .bearer_auth(access_token)
            .query(&[("page", page), ("per_page", self.page_size)])
            .send()
            .await
            .map_err(|e| AppError::FetchFailed(format!("page {} request failed: {}", page, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FetchFailed(format!("{}: {}", status, body)));
        }

        let batch: Vec<StravaActivity> = response
            .json()
            .await
            .map_err(|e| AppError::FetchFailed(format!("page {} is not valid activity data: {}", page, e)))?;
        debug!(page, count = batch.len(), "Fetched activity page");

        Ok(batch.into_iter().map(Activity::from).collect())
    }
}

#[async_trait]
impl ActivitySource for StravaProvider {
    async fn check_token(&self, access_token: &str) -> TokenCheck {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, endpoints::ATHLETE_PATH))
            .bearer_auth(access_token)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => TokenCheck::Valid,
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => TokenCheck::Unauthorized,
            Ok(response) => TokenCheck::Failed(format!("athlete endpoint returned {}", response.status())),
            Err(e) => TokenCheck::Failed(e.to_string()),
        }
    }

    /// Every activity on the account
    ///
    /// Strava gives no last-page marker, so paging stops only at the first
    /// empty page. A short page is not assumed to be the last one.
    async fn fetch_all(&self, access_token: &str) -> Result<Vec<Activity>> {
        let mut activities = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.list_activities(access_token, page).await?;
            if batch.is_empty() {
                break;
            }

            activities.extend(batch);
            info!("Fetched {} activities so far...", activities.len());
            page += 1;
        }

        Ok(activities)
    }
}

#[derive(Debug, Deserialize)]
struct StravaActivity {
    id: u64,
    name: Option<String>,
    #[serde(rename = "type")]
    activity_type: Option<String>,
    sport_type: Option<String>,
    #[serde(deserialize_with = "local_timestamp")]
    start_date_local: NaiveDateTime,
    #[serde(default)]
    moving_time: u64,
    #[serde(default)]
    distance: f64,
}

impl From<StravaActivity> for Activity {
    fn from(strava: StravaActivity) -> Self {
        Activity {
            id: strava.id,
            name: strava.name,
            start_date_local: strava.start_date_local,
            activity_type: strava
                .activity_type
                .or(strava.sport_type)
                .unwrap_or_else(|| "Unknown".to_string()),
            moving_time_seconds: strava.moving_time,
            distance_meters: strava.distance,
        }
    }
}

/// Strava marks local wall-clock times with a misleading `Z`; keep the
/// wall-clock reading and ignore the offset.
fn local_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_local_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid start_date_local: {}", raw))
    })
}

fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}
