//! Line defect tracker library.
//!
//! Final inspectors log defects against line zones, group leaders answer
//! for their zone and managers record the closing analysis. This crate
//! holds the HTTP API, the lifecycle rules, persistence and the xlsx export.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
