use handoff_core::error::CoreError;

/// Error returned by multi-step repository workflows that can refuse a
/// request for domain reasons discovered inside their transaction.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
