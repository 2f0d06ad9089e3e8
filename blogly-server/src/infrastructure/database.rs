use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::data::Repositories;
use crate::infrastructure::config::{AppConfig, Storage};

/// Schema migrations compiled from `blogly-server/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

const APPLICATION_NAME: &str = "blogly";
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let options: PgConnectOptions = database_url.parse()?;
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options.application_name(APPLICATION_NAME))
        .await?;
    info!(max_connections, "database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    MIGRATOR.run(pool).await?;
    info!(known = MIGRATOR.iter().count(), "schema up to date");
    Ok(())
}

/// Empties every table and restarts the id sequences.
pub async fn reset(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("TRUNCATE posts_tags, posts, tags, users RESTART IDENTITY CASCADE")
        .execute(pool)
        .await?;
    info!("database reset");
    Ok(())
}

/// Opens the configured storage, migrating PostgreSQL before handing it out.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Repositories> {
    match &config.storage {
        Storage::Memory => {
            info!("using in-memory storage");
            Ok(Repositories::in_memory())
        }
        Storage::Postgres { url } => {
            let pool = create_pool(url, config.max_connections).await?;
            run_migrations(&pool).await?;
            Ok(Repositories::postgres(pool))
        }
    }
}
