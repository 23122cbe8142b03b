//! HTTP surface tests that need neither PostgreSQL nor S3.
//!
//! Covers the public routes and the session gate in front of every
//! protected route.
//!
//! Run with: cargo test --test api

mod test_helpers;

mod test_public_routes;
mod test_session_gate;
