//! Rendering seam between the turn pipeline and whatever surface shows it.

use taxaumate_core::SourceRef;

pub const SEARCHING_STATUS: &str = "Searching the ATO knowledge base...";
pub const SYNTHESIZING_STATUS: &str = "Synthesizing information and generating response...";

/// Receives the visible progress of one turn.
///
/// A view only displays; the transcript is recorded by the pipeline. Calls
/// arrive in this order: `status`, then `sources` or one or more `warning`s,
/// `status` again, zero or more `partial`s, and finally exactly one of
/// `finish` or `error`.
pub trait TurnView {
    fn status(&mut self, message: &str);

    /// Records found for the question, in merge order.
    fn sources(&mut self, sources: &[SourceRef]);

    /// A non-fatal problem the user should see.
    fn warning(&mut self, message: &str);

    /// The whole sanitized answer so far, not just the newest fragment.
    fn partial(&mut self, text: &str);

    fn finish(&mut self, text: &str);

    fn error(&mut self, message: &str);
}
