//! Domain models for Tô Sabendo.
//!
//! # Stored Entities
//!
//! - [`Project`]: Top-level container with a budget and a status.
//! - [`Activity`]: Scheduled, costed unit of work inside a project.
//!
//! # Derived Views
//!
//! Recomputed from the activity list on every request and never persisted:
//!
//! - [`KpiData`]: Earned-value indicators and the resulting [`RiskLevel`].
//! - [`CriticalPathAnalysis`]: Per-activity schedule entries with critical flags.
//! - [`Roadmap`]: Activities bucketed into calendar quarters.
//! - [`WorkloadEntry`] and [`ProjectFinancials`]: Rollups used by the reports.
//! - [`ChartSeries`]: Output of a user-defined [`ChartSpec`].

mod activity;
mod analytics;
mod chart;
mod project;

pub use activity::*;
pub use analytics::*;
pub use chart::*;
pub use project::*;
