//! Tô Sabendo: project dashboard analytics.
//!
//! Earned-value KPIs, critical path flags, quarterly roadmaps and report
//! generation over projects and activities, served over a small REST API.

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod import;
pub mod models;
pub mod report;
