/// Database layer for LearnIt
///
/// - `pool`: PostgreSQL connection pool with an up-front health check
/// - `migrations`: embedded schema migrations (`learnit-shared/migrations/`)
///
/// # Example
///
/// ```no_run
/// use learnit_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
