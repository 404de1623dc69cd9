//! Pure aggregations over activity lists.
//!
//! Every function here takes its inputs explicitly (including "today" where
//! dates default) and returns a fresh value; nothing is cached or mutated.

mod chart;
mod critical_path;
mod financial;
mod kpi;
mod roadmap;
mod workload;

pub use chart::*;
pub use critical_path::*;
pub use financial::*;
pub use kpi::*;
pub use roadmap::*;
pub use workload::*;

/// Round to a fixed number of decimals, mapping non-finite values to zero.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // Avoid reporting -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `numerator / denominator`, or zero when the denominator is not positive.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let value = numerator / denominator;
        if value.is_finite() {
            value
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// Costs are treated as zero when missing, negative or non-finite.
pub(crate) fn cost(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Completion percentage as a fraction clamped to `0..=1`.
pub(crate) fn completion_fraction(percentage: f64) -> f64 {
    if percentage.is_finite() {
        percentage.clamp(0.0, 100.0) / 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::models::*;

    pub fn activity(name: &str) -> Activity {
        let now = Utc::now();
        Activity {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            name: name.to_string(),
            status: ActivityStatus::NotStarted,
            priority: Priority::Medium,
            planned_cost: 0.0,
            actual_cost: 0.0,
            completion_percentage: 0.0,
            planned_start_date: None,
            actual_start_date: None,
            planned_duration: None,
            is_milestone: false,
            responsible: None,
            discipline: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn costed(
        planned_cost: f64,
        actual_cost: f64,
        completion_percentage: f64,
        status: ActivityStatus,
    ) -> Activity {
        Activity {
            planned_cost,
            actual_cost,
            completion_percentage,
            status,
            ..activity("costed")
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_maps_non_finite_to_zero() {
        assert_eq!(round_to(f64::NAN, 2), 0.0);
        assert_eq!(round_to(f64::INFINITY, 1), 0.0);
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(-0.04, 1), 0.0);
        assert!(round_to(-0.04, 1).is_sign_positive());
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio(10.0, 0.0), 0.0);
        assert_eq!(ratio(10.0, -5.0), 0.0);
        assert_eq!(ratio(3.0, 2.0), 1.5);
    }
}
