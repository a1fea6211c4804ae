// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Console rendering of a weekly summary

use crate::aggregation::WeeklySummary;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 80;
const SECTION_WIDTH: usize = 40;

/// Table with one section per week and one line per activity type
pub fn render_table(summary: &WeeklySummary) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_table(&mut out, summary);
    out
}

fn write_table(out: &mut impl Write, summary: &WeeklySummary) -> fmt::Result {
    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "STRAVA ACTIVITIES BY WEEK AND TYPE")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    if summary.is_empty() {
        return writeln!(out, "\nNo activities found.");
    }

    for (week, types) in summary.weeks() {
        writeln!(out, "\n📅 Week {}", week)?;
        writeln!(out, "{}", "-".repeat(SECTION_WIDTH))?;

        for (activity_type, bucket) in types {
            writeln!(
                out,
                "  🏃 {:15} | {:2} activities | {:5.1}h | {:6.1}km",
                activity_type,
                bucket.count,
                bucket.total_hours(),
                bucket.total_km
            )?;
        }
    }

    Ok(())
}

/// Pretty-printed JSON form of the summary
pub fn render_json(summary: &WeeklySummary) -> String {
    serde_json::to_string_pretty(&summary.to_json()).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use crate::models::Activity;
    use chrono::NaiveDate;

    fn run(day: u32, moving_time: u64, distance: f64) -> Activity {
        Activity {
            id: day as u64,
            name: Some("Run".to_string()),
            start_date_local: NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(7, 0, 0).unwrap(),
            activity_type: "Run".to_string(),
            moving_time_seconds: moving_time,
            distance_meters: distance,
        }
    }

    #[test]
    fn test_table_lines() {
        let summary = aggregate(&[run(8, 1800, 5000.0), run(9, 1800, 5000.0), run(15, 5400, 15000.0)]);
        let table = render_table(&summary);

        assert!(table.contains("STRAVA ACTIVITIES BY WEEK AND TYPE"));
        assert!(table.contains("Week 2024-W02"));
        assert!(table.contains("Run             |  2 activities |   1.0h |   10.0km"));
        assert!(table.contains("Run             |  1 activities |   1.5h |   15.0km"));

        let w02 = table.find("2024-W02").unwrap();
        let w03 = table.find("2024-W03").unwrap();
        assert!(w02 < w03);
    }

    #[test]
    fn test_empty_table() {
        let table = render_table(&aggregate(&[]));
        assert!(table.contains("No activities found."));
    }

    #[test]
    fn test_empty_table_exact() {
        let rule = "=".repeat(80);
        let expected = format!("\n{rule}\nSTRAVA ACTIVITIES BY WEEK AND TYPE\n{rule}\n\nNo activities found.\n");
        assert_eq!(render_table(&aggregate(&[])), expected);
    }

    #[test]
    fn test_json_output() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&aggregate(&[run(8, 1800, 5000.0)]))).unwrap();
        assert_eq!(json["2024-W02"]["Run"]["count"], 1);
    }
}
