/// Schema migrations
///
/// The SQL files under `feedbackhub-shared/migrations/` are compiled into
/// the binary; the server applies whatever is pending on every start.
///
/// # Example
///
/// ```no_run
/// use feedbackhub_shared::db::migrations::{ensure_database_exists, run_migrations};
/// use feedbackhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = std::env::var("DATABASE_URL")?;
/// ensure_database_exists(&url).await?;
///
/// let pool = create_pool(DatabaseConfig::from_url(url)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{
    migrate::{MigrateDatabase, MigrateError, Migrator},
    postgres::PgPool,
    Postgres,
};
use tracing::{error, info};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies pending migrations, each in its own transaction
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let known = MIGRATOR.iter().count();

    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Schema migration failed");
        e
    })?;

    info!(migrations = known, "Schema up to date");
    Ok(())
}

/// Creates the database in `database_url` when it does not exist yet
///
/// Used by the database-backed test suite; deployed databases are created
/// by provisioning.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        return Ok(());
    }

    info!("Creating missing database");
    Postgres::create_database(database_url).await
}
