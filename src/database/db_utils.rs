use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};

use crate::app::AppError;

pub type DbConnection = SqliteConnection;
pub type DbPool = Pool<ConnectionManager<DbConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pragmas applied to every connection handed out by the pool.
/// SQLite keeps foreign key enforcement off unless asked per connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
}

impl CustomizeConnection<DbConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut DbConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Return a pool of connections to the database at `database_url`.
///
/// # Example
/// ```
/// let pool = connect_to_db("blog.db")?;
/// let conn = pool.get()?;
/// ```
pub fn connect_to_db(database_url: &str) -> Result<DbPool, AppError> {
    let manager = ConnectionManager::<DbConnection>::new(database_url);

    Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: Duration::from_secs(5),
        }))
        .build(manager)
        .map_err(|err| {
            error!("could not open database {database_url}: {err}");
            AppError::InternalServerError
        })
}

/// Applies every embedded migration that has not run yet.
pub fn run_migrations(conn: &mut DbConnection) -> Result<(), AppError> {
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|err| {
        error!("migrations failed: {err}");
        AppError::InternalServerError
    })?;

    for version in applied {
        info!("applied migration {version}");
    }

    Ok(())
}
