//! Defect lifecycle E2E test suite.
//!
//! Drives sign-up, defect logging, zone responses, manager analysis and the
//! xlsx export through the HTTP API.
//! Requires a running PostgreSQL database and MinIO (docker compose up -d).
//!
//! Run with: cargo test --test lifecycle_e2e -- --ignored

mod test_helpers;

mod test_accounts;
mod test_defect_flow;
mod test_export;
