use thiserror::Error;

/// Failure while persisting an API call record
///
/// Never reaches the caller of an SDK endpoint; dispatch logs it and moves on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiLogError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("query build error: {0}")]
    Query(#[from] sea_orm::sea_query::error::Error),

    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Table names are interpolated into DDL, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    /// Failure reported by a user-provided sink
    #[error("sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiLogError {
    #[must_use]
    pub fn sink(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Sink(err.into())
    }
}
