//! Error types for the feed engine

use thiserror::Error;

/// Failure reported by a [`crate::RecipeStore`] implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing database rejected or failed the query
    #[error("Recipe store query error: {0}")]
    Query(#[source] sqlx::Error),

    /// The store could not be reached at all
    #[error("Recipe store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(error.to_string())
            }
            other => StoreError::Query(other),
        }
    }
}

/// Error type for feed resolution
#[derive(Error, Debug)]
pub enum FeedError {
    /// A store query failed; no partial page is returned
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Page size must be at least one
    #[error("Invalid page size: {0}")]
    InvalidPageSize(u32),
}

/// Type alias for feed results
pub type FeedResult<T> = Result<T, FeedError>;
