pub mod context;
pub mod merge;
pub mod prompt;
pub mod sanitize;
pub mod session;
pub mod types;

pub use context::{format_context, source_refs};
pub use merge::{DEFAULT_TOP_K, merge_candidates};
pub use prompt::{APOLOGY, ChatMessage, ChatRole, SYSTEM_PROMPT, build_messages};
pub use sanitize::sanitize_response;
pub use session::{Session, WELCOME_MESSAGE};
pub use types::{HydratedRecord, MatchCandidate, Role, SourceRef, SourceType, TranscriptEntry};
