//! Error type for `demeter-store-sqlite`.

use demeter_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] demeter_core::Error),

  /// A SQLite constraint rejected a write: a foreign-key target is missing,
  /// or a unique key (component edge, temporal fact) is already taken.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  /// A transaction could not be started or finished.
  #[error("transaction failure: {0}")]
  Transaction(#[source] rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[source] rusqlite::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    match e {
      rusqlite::Error::SqliteFailure(ref err, ref msg)
        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Error::ConstraintViolation(msg.clone().unwrap_or_else(|| err.to_string()))
      }
      other => Error::Sqlite(other),
    }
  }
}

impl StoreError for Error {
  fn is_not_found(&self) -> bool {
    matches!(self, Error::Core(e) if e.is_not_found())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
