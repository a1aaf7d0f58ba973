//! The answer pipeline for one chat turn: retrieve, prompt, stream, record.

mod error;
pub use error::ChatError;

pub mod assistant;
pub mod view;

pub use assistant::{Assistant, NO_DOCUMENTS_WARNING, Retrieval};
pub use view::{SEARCHING_STATUS, SYNTHESIZING_STATUS, TurnView};
