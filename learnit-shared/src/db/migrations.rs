/// Embedded schema migrations
///
/// Migration files live in `learnit-shared/migrations/` and are compiled
/// into the binary by `sqlx::migrate!`, so a deployed server needs no
/// migration files on disk.
///
/// - `…_create_users.sql`: `users` table with a case-insensitive unique email index
/// - `…_create_posts.sql`: `posts` table with an owner foreign key

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
///
/// Already-applied migrations are skipped, so this is safe to call on every
/// startup.
///
/// # Errors
///
/// Returns an error if a migration fails or the database connection is lost
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_migrations_are_embedded() {
        let migrator = sqlx::migrate!("./migrations");
        let descriptions: Vec<_> = migrator
            .iter()
            .map(|m| m.description.to_string())
            .collect();

        assert_eq!(descriptions, vec!["create users", "create posts"]);
    }
}
