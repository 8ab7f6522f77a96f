//! Conversions from external infrastructure errors into domain errors.

use rusqlite::Error as SqlError;
use signalkeeper_domain::SignalKeeperError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SignalKeeperError);

impl From<InfraError> for SignalKeeperError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SignalKeeperError> for InfraError {
    fn from(value: SignalKeeperError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSignalKeeperError {
    fn into_domain(self) -> SignalKeeperError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SignalKeeperError */
/* -------------------------------------------------------------------------- */

impl IntoSignalKeeperError for SqlError {
    fn into_domain(self) -> SignalKeeperError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SignalKeeperError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SignalKeeperError::Database("database is locked".into())
                    }
                    // SQLITE_CONSTRAINT_PRIMARYKEY / SQLITE_CONSTRAINT_UNIQUE
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        SignalKeeperError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 275) => SignalKeeperError::InvalidInput(
                        format!("check constraint failed: {message}"),
                    ),
                    (ErrorCode::NotADatabase, _) => SignalKeeperError::Database(
                        "file is not a SignalKeeper database".into(),
                    ),
                    _ => SignalKeeperError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                SignalKeeperError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                SignalKeeperError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                SignalKeeperError::Database(format!("invalid column type for '{name}': {ty}"))
            }
            RE::Utf8Error(_) => {
                SignalKeeperError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => SignalKeeperError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => SignalKeeperError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SignalKeeperError */
/* -------------------------------------------------------------------------- */

impl IntoSignalKeeperError for r2d2::Error {
    fn into_domain(self) -> SignalKeeperError {
        SignalKeeperError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* JoinError → SignalKeeperError */
/* -------------------------------------------------------------------------- */

impl IntoSignalKeeperError for JoinError {
    fn into_domain(self) -> SignalKeeperError {
        if self.is_cancelled() {
            SignalKeeperError::Internal("blocking task was cancelled".into())
        } else {
            SignalKeeperError::Internal(format!("blocking task panicked: {self}"))
        }
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → SignalKeeperError */
/* -------------------------------------------------------------------------- */

impl IntoSignalKeeperError for std::io::Error {
    fn into_domain(self) -> SignalKeeperError {
        match self.kind() {
            std::io::ErrorKind::NotFound => SignalKeeperError::NotFound(self.to_string()),
            _ => SignalKeeperError::Internal(format!("I/O error: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_domain())
    }
}

/* -------------------------------------------------------------------------- */
/* Config file formats → SignalKeeperError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(SignalKeeperError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(SignalKeeperError::Config(format!("Invalid JSON format: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
