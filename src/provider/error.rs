use crate::auth::ErrorKind;

/// Failures that are not the caller's fault. These are logged and reported
/// on the wire only as `server_error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("token signing failure: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("hashing failure: {0}")]
    Hashing(#[from] argon2::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "postgres")]
    #[error("database failure: {0}")]
    Db(#[from] diesel::result::Error),
    #[cfg(feature = "postgres")]
    #[error("connection pool failure: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl From<Error> for ErrorKind {
    fn from(_: Error) -> Self {
        ErrorKind::ServerError
    }
}

pub trait ResultExt<T> {
    /// Logs an internal failure and collapses it into `server_error`.
    fn or_server_error(self, context: &'static str) -> Result<T, ErrorKind>;
}

impl<T> ResultExt<T> for Result<T, Error> {
    fn or_server_error(self, context: &'static str) -> Result<T, ErrorKind> {
        self.map_err(|e| {
            tracing::event!(tracing::Level::ERROR, error = %e, "{}", context);
            ErrorKind::ServerError
        })
    }
}
