use crate::models::{Activity, ActivityStatus, EarnedValueTotals, KpiData, RiskLevel};

use super::{completion_fraction, cost, ratio, round_to};

/// SPI/CPI thresholds, most severe first.
const RISK_THRESHOLDS: [(f64, RiskLevel); 3] = [
    (0.8, RiskLevel::Critical),
    (0.9, RiskLevel::High),
    (0.95, RiskLevel::Medium),
];

/// Sum the earned-value inputs of a set of activities.
///
/// Planned value is approximated as `total planned cost * completed share`;
/// there is no baseline schedule to derive a date-based PV from.
pub fn earned_value_totals(activities: &[Activity]) -> EarnedValueTotals {
    let activity_count = activities.len();
    if activity_count == 0 {
        return EarnedValueTotals::default();
    }

    let total_planned_cost: f64 = activities.iter().map(|a| cost(a.planned_cost)).sum();
    let total_actual_cost: f64 = activities.iter().map(|a| cost(a.actual_cost)).sum();
    let completed_count = activities
        .iter()
        .filter(|a| a.status == ActivityStatus::Completed)
        .count();
    let earned_value: f64 = activities
        .iter()
        .map(|a| cost(a.planned_cost) * completion_fraction(a.completion_percentage))
        .sum();
    let planned_value = total_planned_cost * (completed_count as f64 / activity_count as f64);

    EarnedValueTotals {
        activity_count,
        completed_count,
        total_planned_cost,
        total_actual_cost,
        planned_value,
        earned_value,
    }
}

/// Compute the earned-value KPIs for a set of activities.
///
/// An empty list yields all zeros with [`RiskLevel::Low`]. Every ratio is
/// guarded against a zero denominator, so the result never holds NaN or
/// infinity.
pub fn compute_kpis(activities: &[Activity]) -> KpiData {
    if activities.is_empty() {
        return KpiData::default();
    }
    kpis_from_totals(&earned_value_totals(activities))
}

/// Derive [`KpiData`] from already summed totals.
pub fn kpis_from_totals(totals: &EarnedValueTotals) -> KpiData {
    if totals.activity_count == 0 {
        return KpiData::default();
    }

    let spi = ratio(totals.earned_value, totals.planned_value);
    let cpi = ratio(totals.earned_value, totals.total_actual_cost);
    let completion_rate = ratio(
        totals.completed_count as f64 * 100.0,
        totals.activity_count as f64,
    );
    let budget_variance = ratio(
        (totals.earned_value - totals.total_actual_cost) * 100.0,
        totals.total_planned_cost,
    );
    let schedule_variance = ratio(
        (totals.earned_value - totals.planned_value) * 100.0,
        totals.total_planned_cost,
    );

    KpiData {
        spi: round_to(spi, 2),
        cpi: round_to(cpi, 2),
        completion_rate: round_to(completion_rate, 1),
        budget_variance: round_to(budget_variance, 1),
        schedule_variance: round_to(schedule_variance, 1),
        risk_level: classify_risk(spi, cpi),
    }
}

/// Classify risk from SPI and CPI; the first threshold either index falls below wins.
pub fn classify_risk(spi: f64, cpi: f64) -> RiskLevel {
    RISK_THRESHOLDS
        .iter()
        .find(|(threshold, _)| spi < *threshold || cpi < *threshold)
        .map(|(_, level)| *level)
        .unwrap_or(RiskLevel::Low)
}
