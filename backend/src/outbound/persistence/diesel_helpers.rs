//! Shared error mapping for the Diesel repositories.
//!
//! Every repository port error has `Connection` and `Query` variants;
//! [`RepositoryFailure`] lets one pair of mapping functions serve them all.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::{
    ApplicationRepositoryError, MessageRepositoryError, NotificationRepositoryError,
    PetRepositoryError, UserRepositoryError,
};

use super::models::CorruptRow;
use super::pool::PoolError;

/// Port errors constructible from infrastructure failures.
pub(crate) trait RepositoryFailure: Sized {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;
}

macro_rules! impl_repository_failure {
    ($($error:ty),+ $(,)?) => {
        $(
            impl RepositoryFailure for $error {
                fn connection(message: String) -> Self {
                    <$error>::connection(message)
                }

                fn query(message: String) -> Self {
                    <$error>::query(message)
                }
            }
        )+
    };
}

impl_repository_failure!(
    UserRepositoryError,
    PetRepositoryError,
    ApplicationRepositoryError,
    MessageRepositoryError,
    NotificationRepositoryError,
);

/// Map a pool checkout failure to a connection error.
pub(crate) fn map_pool_error<E: RepositoryFailure>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => E::connection(message),
    }
}

/// Map a Diesel failure, keeping driver detail out of the message.
pub(crate) fn map_diesel_error<E: RepositoryFailure>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => E::query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection("database connection error".to_owned())
        }
        _ => E::query("database error".to_owned()),
    }
}

/// Map a row that no longer decodes into a domain value.
pub(crate) fn map_corrupt_row<E: RepositoryFailure>(error: CorruptRow) -> E {
    warn!(error = %error, "stored row failed domain validation");
    E::query(error.to_string())
}

/// Map a JSON column that failed to serialise.
pub(crate) fn map_json_error<E: RepositoryFailure>(error: serde_json::Error) -> E {
    E::query(format!("failed to encode json column: {error}"))
}

/// True when `error` is a unique violation on `constraint`.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err: PetRepositoryError = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, PetRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_errors_become_query_errors() {
        let err: UserRepositoryError = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn unique_violation_check_ignores_other_errors() {
        assert!(!is_unique_violation(&DieselError::NotFound, "any"));
    }
}
