use chrono::{Datelike, NaiveDate};

use crate::models::{Activity, ActivityStatus, Roadmap, RoadmapQuarter};

use super::{ratio, round_to};

/// Calendar quarter (1..=4) a date falls in.
pub fn quarter_of(date: NaiveDate) -> u8 {
    (date.month0() / 3) as u8 + 1
}

/// Bucket activities into four quarters by planned start month.
///
/// Only the month decides the bucket; `year` labels the roadmap. Activities
/// without a planned start date appear in no bucket.
pub fn build_roadmap(activities: &[Activity], year: i32) -> Roadmap {
    let mut buckets: [Vec<&Activity>; 4] = Default::default();
    for activity in activities {
        if let Some(start) = activity.planned_start_date {
            buckets[usize::from(quarter_of(start) - 1)].push(activity);
        }
    }

    let quarters = buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| {
            let completed_count = bucket
                .iter()
                .filter(|a| a.status == ActivityStatus::Completed)
                .count();
            RoadmapQuarter {
                quarter: index as u8 + 1,
                label: format!("Q{} {}", index + 1, year),
                activity_ids: bucket.iter().map(|a| a.id).collect(),
                activity_count: bucket.len(),
                milestone_count: bucket.iter().filter(|a| a.is_milestone).count(),
                completed_count,
                completion_rate: round_to(
                    ratio(completed_count as f64 * 100.0, bucket.len() as f64),
                    1,
                ),
            }
        })
        .collect();

    Roadmap { year, quarters }
}
