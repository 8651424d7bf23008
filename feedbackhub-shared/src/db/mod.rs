//! PostgreSQL plumbing: the connection pool and embedded schema migrations.
//!
//! The SQL for each table lives next to its model in [`crate::models`]; this
//! module only owns connection lifecycle and schema versioning.

pub mod migrations;
pub mod pool;
