//! Interactive session state: the ordered transcript of one conversation.

use crate::types::{Role, TranscriptEntry};

/// Opening assistant message shown before the first question.
pub const WELCOME_MESSAGE: &str = "\
Important Information:
  - All data is sourced from official ATO documentation.
  - This tool provides only general information and is not to be considered professional tax advice.
  - The LLM used is a general guidance model and hence accuracy may not be perfect.
  - This prototype model has limited features and does not perform accurate calculations yet.

Sample Questions:
  - What are the common tax deductions available for individuals in Australia?
  - What is the primary purpose of the global minimum tax (Pillar Two)?
  - What is the fixed ratio test within thin capitalization rules, and what are its key components?
  - What happens if a company does not lodge a tax return on time?

How can I help you today?";

/// One conversation's append-only transcript.
///
/// A session is passed by `&mut` into each turn, so turns are serialised by
/// the borrow: the next question cannot start until the previous turn has
/// appended its reply.
#[derive(Debug, Clone, Default)]
pub struct Session {
    transcript: Vec<TranscriptEntry>,
}

impl Session {
    /// An empty session with no welcome entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose first entry is the assistant welcome message.
    pub fn with_welcome() -> Self {
        let mut session = Self::new();
        session.push(Role::Assistant, WELCOME_MESSAGE);
        session
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content);
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            role,
            content: content.into(),
        });
    }

    /// All entries in chronological order.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.transcript.last()
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_is_first_assistant_entry() {
        let session = Session::with_welcome();
        assert_eq!(session.len(), 1);
        let first = &session.transcript()[0];
        assert_eq!(first.role, Role::Assistant);
        assert!(first.content.ends_with("How can I help you today?"));
    }

    #[test]
    fn entries_append_in_order() {
        let mut session = Session::new();
        assert!(session.is_empty());
        session.push_user("What is the tax-free threshold?");
        session.push_assistant("The tax-free threshold is $18,200.");
        session.push_user("And for non-residents?");

        let roles: Vec<Role> = session.transcript().iter().map(|e| e.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(session.last().unwrap().content, "And for non-residents?");
    }
}
