//! Performance trajectory scoring and cycle-based risk detection.
//!
//! The [`workflows::trajectory`] workflow turns a feed of performance signals into scored,
//! classified trajectory snapshots and manager intervention prompts. The
//! [`workflows::cycle_risk`] workflow scans appraisal-cycle ratings and certification expiry
//! for persistent risk patterns and keeps the active-risk table reconciled.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
