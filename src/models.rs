// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Provider-neutral representation of a fetched activity. Only the fields the
//! weekly aggregation needs are kept; the activity type stays an open string
//! because Strava adds new sport types over time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single exercise record as returned by the provider
///
/// # Examples
///
/// ```rust
/// use strava_weekly::models::Activity;
/// use chrono::NaiveDate;
///
/// let activity = Activity {
///     id: 12345,
///     name: Some("Morning Run".to_string()),
///     start_date_local: NaiveDate::from_ymd_opt(2024, 1, 8)
///         .unwrap()
///         .and_hms_opt(7, 0, 0)
///         .unwrap(),
///     activity_type: "Run".to_string(),
///     moving_time_seconds: 1800,
///     distance_meters: 5000.0,
/// };
/// assert_eq!(activity.moving_time_minutes(), 30.0);
/// assert_eq!(activity.distance_km(), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Provider identifier
    pub id: u64,
    /// Human-readable title
    pub name: Option<String>,
    /// Wall-clock start time in the athlete's timezone
    pub start_date_local: NaiveDateTime,
    /// Provider-defined activity type (Run, Ride, Swim, ...)
    pub activity_type: String,
    /// Time spent in motion, pauses excluded
    pub moving_time_seconds: u64,
    pub distance_meters: f64,
}

impl Activity {
    pub fn moving_time_minutes(&self) -> f64 {
        self.moving_time_seconds as f64 / crate::constants::limits::SECONDS_PER_MINUTE
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / crate::constants::limits::METERS_PER_KILOMETER
    }
}
