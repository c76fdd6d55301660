// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::result::DatabaseErrorKind;

#[derive(Debug, Display)]
pub enum Error {
    #[display("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[display("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[display("authentication required")]
    Unauthenticated,
    #[display("database error: {_0}")]
    Database(diesel::result::Error),
    #[display("failed to connect to database: {_0}")]
    Connection(diesel::ConnectionError),
    #[display("failed to run migrations: {_0}")]
    Migration(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[display("{_0}")]
    Io(std::io::Error),
    #[display("failed to initialize logging: {_0}")]
    Logger(log::SetLoggerError),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Turns a unique-constraint violation from the store into a validation error on `field`.
    pub fn unique_violation_as(self, field: &'static str, message: &str) -> Self {
        match self {
            Self::Database(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => Self::validation(field, message),
            other => other,
        }
    }

    #[cfg(test)]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::Connection(e) => Some(e),
            Self::Migration(e) => Some(e.as_ref()),
            Self::Io(e) => Some(e),
            Self::Logger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        Self::Database(e)
    }
}

impl From<diesel::ConnectionError> for Error {
    fn from(e: diesel::ConnectionError) -> Self {
        Self::Connection(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(e: log::SetLoggerError) -> Self {
        Self::Logger(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn unique_violation_becomes_validation_error() {
    struct Info;
    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "UNIQUE constraint failed"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    let e = Error::from(diesel::result::Error::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(Info),
    ));
    let e = e.unique_violation_as("title", "already exists");
    assert!(e.is_validation());
    assert_eq!(e.to_string(), "title: already exists");

    let e = Error::from(diesel::result::Error::NotFound).unique_violation_as("title", "nope");
    assert!(matches!(e, Error::Database(_)));
}
