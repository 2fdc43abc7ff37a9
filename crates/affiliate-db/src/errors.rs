use std::fmt::Display;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Failures while setting the database up.
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("cannot init database pool : {0}")]
    Pool(String),
    #[error("cannot run database migrations : {0}")]
    Migrations(String),
}

/// Runtime database failure, tagged with the operation that hit it.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("No connection available for '{operation}': {message}")]
    PoolError { operation: String, message: String },

    #[error("Connection task failed during '{operation}': {message}")]
    InteractionError { operation: String, message: String },

    #[error("Nothing found for '{operation}'")]
    NotFound { operation: String },

    #[error("Query failed during '{operation}': {message}")]
    QueryError { operation: String, message: String },

    #[error("Constraint violated during '{operation}': {message}")]
    ConstraintViolation { operation: String, message: String },
}

impl DatabaseError {
    pub fn not_found(operation: impl Display) -> Self {
        Self::NotFound {
            operation: operation.to_string(),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn operation(&self) -> &str {
        match self {
            Self::PoolError { operation, .. }
            | Self::InteractionError { operation, .. }
            | Self::NotFound { operation }
            | Self::QueryError { operation, .. }
            | Self::ConstraintViolation { operation, .. } => operation,
        }
    }

    /// Classifies a diesel error raised while running `operation`.
    pub fn from_diesel(operation: impl Display, err: DieselError) -> Self {
        let operation = operation.to_string();
        match err {
            DieselError::NotFound => Self::NotFound { operation },
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::NotNullViolation,
                info,
            ) => Self::ConstraintViolation {
                operation,
                message: info.message().to_string(),
            },
            other => Self::QueryError {
                operation,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_diesel_keeps_operation() {
        let err = DatabaseError::from_diesel("find program prog_1", DieselError::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.operation(), "find program prog_1");

        let err = DatabaseError::from_diesel("list commissions", DieselError::RollbackTransaction);
        assert!(matches!(err, DatabaseError::QueryError { .. }));
        assert_eq!(err.operation(), "list commissions");
    }
}
