use actix_session::SessionInsertError;
use actix_web::{error::BlockingError, http::StatusCode, web, HttpResponse, ResponseError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::error;
use thiserror::Error;

use crate::database::db_utils::{self, DbConnection, DbPool};

/** Used for storing the database connections when handling requests */
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

impl AppState {
    /// Opens the pool for `database_url` and brings the schema up to date.
    pub fn new(database_url: &str) -> Result<AppState, AppError> {
        let pool = db_utils::connect_to_db(database_url)?;
        let mut conn = pool.get()?;
        db_utils::run_migrations(&mut conn)?;
        drop(conn);

        Ok(AppState { pool })
    }

    /// Runs `query` with a pooled connection on the blocking thread pool.
    pub async fn db<F, T>(&self, query: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut DbConnection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        web::block(move || {
            let mut conn = pool.get()?;
            query(&mut *conn)
        })
        .await?
    }
}

/** Holds the errors we will used during request processing */
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error")]
    InternalServerError,
    #[error("Bad request")]
    BadRequest,
    #[error("Forbidden")]
    Forbidden,
    #[error("Not found")]
    NotFound,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

impl From<DieselError> for AppError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => AppError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
            | DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                AppError::BadRequest
            }
            DieselError::QueryBuilderError(_) => AppError::BadRequest,
            err => {
                error!("database error: {err}");
                AppError::InternalServerError
            }
        }
    }
}
impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        error!("could not get a database connection: {err}");
        AppError::InternalServerError
    }
}
impl From<BlockingError> for AppError {
    fn from(_: BlockingError) -> Self {
        error!("blocking task was cancelled");
        AppError::InternalServerError
    }
}
impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        error!("password hashing failed: {err}");
        AppError::InternalServerError
    }
}
impl From<SessionInsertError> for AppError {
    fn from(err: SessionInsertError) -> Self {
        error!("session write failed: {err}");
        AppError::InternalServerError
    }
}
