use diesel_async::pooled_connection::deadpool::PoolError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid URL")]
    InvalidUrl,
    #[error("URL is required")]
    EmptyUrl,
    #[error("Title is required")]
    EmptyTitle,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("You must be logged in to add bookmarks")]
    MissingSession,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("{0}")]
    Rejected(String),
}

impl From<PoolError> for StorageError {
    fn from(e: PoolError) -> Self {
        StorageError::Pool(e.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("realtime channel is unavailable")]
    Unavailable,
    #[error("realtime channel lagged behind by {0} events")]
    Lagged(u64),
    #[error("realtime channel closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error("A submission is already in progress")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
