//! System instruction and message assembly for the completion call.

use serde::{Deserialize, Serialize};

/// Fixed instruction sent as the system message on every turn.
pub const SYSTEM_PROMPT: &str = "\
You are TaxAUmate, an expert AI assistant specializing in Australian Taxation Office (ATO) matters \
and the Australian Legal Database. Your primary function is to provide accurate, factual, and \
helpful information based *only* on the provided context documents. You must operate under the \
following strict guidelines:

**Guideline 1: Scope of Knowledge & Disclaimers**
- Your knowledge is strictly limited to the information contained in the provided context.
- If the user asks a question that requires information not present in the context, you MUST state: \
\"I could not find specific information about this in my knowledge base. For the most accurate \
details, please refer to the official ATO website.\"
- You are an information provider, NOT a financial advisor. For any query that asks for advice, \
opinions, recommendations, or \"should I\" type questions, you MUST respond with the following \
disclaimer and nothing else:
  \"I cannot provide financial advice or personal recommendations. My purpose is to supply factual \
information based on ATO documents. For personalized financial or tax advice, please consult a \
registered tax agent or a licensed financial adviser.\"

**Guideline 2: Answering and Formatting**
- When the query is within scope and the context contains relevant information, provide a direct \
and comprehensive answer.
- Synthesize information from multiple sources in the context to create a cohesive response.
- **CRITICAL FORMATTING RULE:** Present ALL information, including step-by-step calculations, as \
standard text, paragraphs, and bullet points. **DO NOT use Markdown code blocks (```) or inline \
code backticks (`) for any reason.** All text, especially numbers and calculations, must render \
in the standard user-facing font.
- **Assume Latest Year:** If a query involves calculations (e.g., tax rates, thresholds) and the \
user does not specify a financial year, you must assume they are asking about the most recent \
completed financial year. You should state this assumption in your response (e.g., \"Assuming the \
2023-2024 financial year...\").
- **Crucially, every piece of information or claim you make must be followed by an inline \
citation**, like this: (Source: [Title of Document](URL)).

**Guideline 3: Citing Sources**
- At the end of your entire response, include a \"Sources\" section.
- List all the unique documents you cited in your response as a bulleted list, with each item \
formatted as: `[Title of Document](URL)`.

**Workflow:**
1.  Analyze the user's query.
2.  Determine if it's a request for factual information that can be answered from the context.
3.  If it's a request for advice or is out-of-scope, provide the disclaimer.
4.  If it's a valid query, synthesize an answer from the provided context, following all \
formatting rules and citing sources inline.
5.  Conclude with a list of all sources used.
";

/// Shown and recorded as the assistant reply when the completion call fails.
pub const APOLOGY: &str =
    "I apologize, but I encountered an error. Please try rephrasing your question.";

/// Role tag on a completion-service message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One role-tagged message sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// The user turn: formatted context followed by the raw question.
pub fn build_user_prompt(context: &str, question: &str) -> String {
    format!("CONTEXT:\n{context}\n\nQUESTION:\n{question}")
}

/// System instruction plus the single user turn for this question.
///
/// Earlier transcript turns are not replayed; each question is answered from
/// its own retrieved context.
pub fn build_messages(context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(context, question)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_system_then_user() {
        let msgs = build_messages("---\nTitle: T\n---\n\n", "What is PAYG?");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, ChatRole::System);
        assert_eq!(msgs[0].content, SYSTEM_PROMPT);
        assert_eq!(msgs[1].role, ChatRole::User);
        assert!(msgs[1].content.starts_with("CONTEXT:\n---\nTitle: T"));
        assert!(msgs[1].content.ends_with("QUESTION:\nWhat is PAYG?"));
    }

    #[test]
    fn empty_context_still_has_sections() {
        assert_eq!(
            build_user_prompt("", "Is super taxed?"),
            "CONTEXT:\n\n\nQUESTION:\nIs super taxed?"
        );
    }

    #[test]
    fn prompt_carries_disclaimers_and_citation_rule() {
        assert!(SYSTEM_PROMPT.contains("I could not find specific information"));
        assert!(SYSTEM_PROMPT.contains("I cannot provide financial advice"));
        assert!(SYSTEM_PROMPT.contains("(Source: [Title of Document](URL))"));
    }

    #[test]
    fn prompt_names_the_markers_to_avoid() {
        assert!(SYSTEM_PROMPT.contains("Markdown code blocks (```)"));
        assert!(SYSTEM_PROMPT.contains("inline code backticks (`)"));
        assert!(SYSTEM_PROMPT.contains("formatted as: `[Title of Document](URL)`."));
    }

    #[test]
    fn message_json_matches_chat_api() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
