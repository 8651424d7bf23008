/// Database models for FeedbackHub
///
/// This module contains all database models and their SQL operations.
/// Services never call these directly; they go through
/// [`crate::store::Store`], whose PostgreSQL implementation delegates here.
///
/// # Models
///
/// - `user`: Accounts, roles and the public identity view
/// - `team`: Teams, membership assignment and sentiment statistics
/// - `feedback`: Feedback records, partial updates, acknowledgement
/// - `comment`: Comment threads under feedback
/// - `tag`: Global tag vocabulary and feedback links
/// - `notification`: Per-user notification inbox
///
/// # Example
///
/// ```no_run
/// use feedbackhub_shared::models::team::Team;
/// use feedbackhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// for team in Team::list(&pool).await? {
///     println!("{} ({})", team.name, team.id);
/// }
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod feedback;
pub mod notification;
pub mod tag;
pub mod team;
pub mod user;
