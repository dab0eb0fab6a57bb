use rollcall_core::AppError;

/// Failures reported by a [`Store`](crate::Store) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. Carries the constraint
    /// name.
    #[error("duplicate value violates {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let constraint = match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Some(db.constraint().unwrap_or("unique constraint").to_string())
            }
            _ => None,
        };

        match constraint {
            Some(constraint) => StoreError::UniqueViolation(constraint),
            None => StoreError::Database(err),
        }
    }
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }

    /// Converts into an [`AppError`]: unique violations become
    /// `DuplicateRecord` with `duplicate_message`, everything else is
    /// internal.
    pub fn into_app_error(self, duplicate_message: &str) -> AppError {
        match self {
            StoreError::UniqueViolation(constraint) => {
                tracing::debug!(%constraint, "Unique constraint violated");
                AppError::duplicate(anyhow::anyhow!(duplicate_message.to_string()))
            }
            other => AppError::database(other),
        }
    }
}
