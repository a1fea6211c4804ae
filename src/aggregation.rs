// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Weekly Aggregation
//!
//! Folds activities into (ISO week, activity type) buckets. Weeks follow
//! ISO-8601: they start on Monday and week 1 is the week holding the year's
//! first Thursday, so late-December dates can belong to the next year's
//! week 1 and early-January dates to the previous year's last week.

use crate::models::Activity;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// ISO year and week number; orders the same way as its `YYYY-Www` label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn from_datetime(timestamp: NaiveDateTime) -> Self {
        let iso = timestamp.date().iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Totals for one activity type within one week
///
/// `Default` is the zero bucket a cell starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub count: u32,
    /// Moving time in minutes
    #[serde(rename = "time")]
    pub total_minutes: f64,
    /// Distance in kilometers
    #[serde(rename = "distance")]
    pub total_km: f64,
}

impl WeeklyBucket {
    pub fn add(&mut self, activity: &Activity) {
        self.count += 1;
        self.total_minutes += activity.moving_time_minutes();
        self.total_km += activity.distance_km();
    }

    pub fn total_hours(&self) -> f64 {
        self.total_minutes / crate::constants::limits::MINUTES_PER_HOUR
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklySummary {
    weeks: BTreeMap<WeekKey, BTreeMap<String, WeeklyBucket>>,
}

impl WeeklySummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket for `(week, activity_type)`, inserting a zero bucket first
    /// if the cell has not been touched yet
    pub fn bucket_mut(&mut self, week: WeekKey, activity_type: &str) -> &mut WeeklyBucket {
        self.weeks
            .entry(week)
            .or_default()
            .entry(activity_type.to_string())
            .or_default()
    }

    pub fn add(&mut self, activity: &Activity) {
        let week = WeekKey::from_datetime(activity.start_date_local);
        self.bucket_mut(week, &activity.activity_type).add(activity);
    }

    pub fn get(&self, week: WeekKey, activity_type: &str) -> Option<&WeeklyBucket> {
        self.weeks.get(&week)?.get(activity_type)
    }

    /// Weeks in ascending order, each with its activity types in name order
    pub fn weeks(&self) -> impl Iterator<Item = (&WeekKey, &BTreeMap<String, WeeklyBucket>)> + '_ {
        self.weeks.iter()
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// `{"2024-W02": {"Run": {"count": 2, "time": 60.0, "distance": 10.0}}}`
    pub fn to_json(&self) -> Value {
        let weeks: Map<String, Value> = self
            .weeks
            .iter()
            .map(|(week, types)| {
                let types: Map<String, Value> = types
                    .iter()
                    .map(|(activity_type, bucket)| {
                        (
                            activity_type.clone(),
                            serde_json::to_value(bucket).unwrap_or(Value::Null),
                        )
                    })
                    .collect();
                (week.to_string(), Value::Object(types))
            })
            .collect();

        Value::Object(weeks)
    }
}

/// Group activities by ISO week and activity type
///
/// Every activity is counted, duplicates included.
pub fn aggregate(activities: &[Activity]) -> WeeklySummary {
    let mut summary = WeeklySummary::new();
    for activity in activities {
        summary.add(activity);
    }
    summary
}
