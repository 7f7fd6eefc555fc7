//! AgingScope - aging and timeline analytics for GRC registers.
//!
//! The library turns JSON exports of findings, gaps and threats into aging
//! figures computed against an explicit reference instant:
//!
//! - [`snapshot`] reads exports and normalizes timestamps,
//! - [`analysis`] computes ages, timeline status, distributions and trends,
//! - [`report`] renders the result as Markdown or JSON.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod models;
pub mod report;
pub mod snapshot;
