//! Vendor nomination workflows for manufacturing sourcing: field mapping, cost-competency
//! ranking, capability scoring, and the HTTP surface that exposes them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
