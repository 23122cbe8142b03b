//! SeaORM entity definitions for PostgreSQL database.

pub mod defect;
pub mod manager_analysis;
pub mod user;
pub mod zone_response;
