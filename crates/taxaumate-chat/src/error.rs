use taxaumate_ai::AiError;
use taxaumate_store::StoreError;
use thiserror::Error;

/// Failure inside one stage of a turn.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
