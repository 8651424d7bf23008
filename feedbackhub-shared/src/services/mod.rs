//! Domain services
//!
//! Free async functions over `&dyn Store`. Each takes the acting user where
//! authorization matters and returns a [`ServiceError`] from the shared
//! taxonomy, which the API maps onto HTTP statuses.
//!
//! - `registration`: account creation and login
//! - `teams`: team registry, membership, statistics
//! - `feedback`: feedback lifecycle, comments, export
//! - `tags`: tag vocabulary
//! - `notifications`: per-user inbox
//! - `drafting`: AI-assisted feedback composition

pub mod drafting;
pub mod error;
pub mod feedback;
pub mod notifications;
pub mod registration;
pub mod tags;
pub mod teams;

pub use error::{ServiceError, ServiceResult};
