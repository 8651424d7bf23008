//! # FeedbackHub Shared Library
//!
//! Domain types, persistence, authentication and the feedback lifecycle
//! services used by the FeedbackHub API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their SQL operations
//! - `store`: The `Store` trait with PostgreSQL and in-memory implementations
//! - `services`: Team registry, feedback lifecycle, tags and notifications
//! - `auth`: Password hashing, JWT tokens, identity resolution, role gates
//! - `ai`: AI drafting client (feedback drafts, rephrasing, sentiment, tags)
//! - `report`: PDF export of feedback collections
//! - `db`: Connection pool and migrations

pub mod ai;
pub mod auth;
pub mod db;
pub mod models;
pub mod report;
pub mod services;
pub mod store;

/// Current version of the FeedbackHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
