use rocket_db_pools::{Database, sqlx};

/// Postgres pool configured under `databases.albums_db` in the Rocket figment.
#[derive(Database)]
#[database("albums_db")]
pub struct AlbumsDb(sqlx::PgPool);

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply pending schema migrations before serving traffic.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
    log::info!("checking database migration state");
    MIGRATOR.run(pool).await?;
    log::info!("database migrations up to date");
    Ok(())
}
