//! # FeedbackHub API Server Library
//!
//! HTTP surface of FeedbackHub: managers give structured feedback to the
//! employees of their team, employees acknowledge and discuss it.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
