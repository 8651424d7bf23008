/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `users`: Current user and unassigned employees
/// - `teams`: Team registry and statistics
/// - `feedback`: Feedback lifecycle, comments and PDF export
/// - `tags`: Tag vocabulary
/// - `notifications`: Per-user inbox
/// - `ai`: AI-assisted drafting

pub mod ai;
pub mod auth;
pub mod feedback;
pub mod health;
pub mod notifications;
pub mod tags;
pub mod teams;
pub mod users;
