//! Assembly of the prompt sent to the chat-completion API.

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, Role, UserLevel};
use crate::subject::Subject;

/// Maximum number of history messages forwarded upstream.
pub const HISTORY_LIMIT: usize = 10;

/// Fixed tutor persona placed at the start of every system prompt.
pub const TUTOR_PERSONA: &str = "\
You are LearnMate AI Tutor, a friendly and knowledgeable educational assistant. \
You help students with questions about their courses, topics, and general academic work.

How you answer:
- Keep explanations clear, concise, and encouraging
- Be accurate, and nurture the student's curiosity
- Work through problems step by step
- Use examples and analogies to make hard ideas approachable
- Match your vocabulary to the student's level
- Point to related topics or follow-up questions when it helps

You can help with mathematics, the sciences (physics, chemistry, biology), \
computer science, languages and literature, history, geography, economics, \
and study skills.

If a question falls outside education, gently steer the student back: \
\"I'm here to help with your studies and learning! Let's focus on educational topics. \
Is there something specific you'd like to learn about today?\"

Close each answer with encouragement and an offer to help further.";

/// Role of an entry in the upstream prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// Persona and instructions.
    System,
    /// The student.
    User,
    /// The tutor.
    Assistant,
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// One role/content pair of the upstream prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who the content is attributed to.
    pub role: PromptRole,
    /// The text.
    pub content: String,
}

impl PromptMessage {
    /// Creates a prompt entry.
    #[must_use]
    pub fn new(role: PromptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for PromptMessage {
    fn from(message: &ChatMessage) -> Self {
        Self::new(message.role.into(), message.content.clone())
    }
}

/// Builds the system prompt: persona plus a level/subject clause.
#[must_use]
pub fn system_prompt(level: UserLevel, subject: Option<Subject>) -> String {
    let mut prompt = String::from(TUTOR_PERSONA);
    prompt.push_str("\n\nThe student is at ");
    prompt.push_str(level.as_str());
    prompt.push_str(" level.");
    if let Some(subject) = subject {
        prompt.push_str(" They are asking about ");
        prompt.push_str(subject.as_str());
        prompt.push('.');
    }
    prompt.push_str(" Please adjust your explanation accordingly.\n");
    prompt
}

/// Builds the ordered prompt for one tutoring turn.
///
/// The result is the system prompt, then the newest [`HISTORY_LIMIT`]
/// history entries in their original order (timestamps dropped), then the
/// current message as a user entry. `history` itself is left untouched.
#[must_use]
pub fn build(
    message: &str,
    history: &[ChatMessage],
    level: UserLevel,
    subject: Option<Subject>,
) -> Vec<PromptMessage> {
    let tail = &history[history.len().saturating_sub(HISTORY_LIMIT)..];

    let mut context = Vec::with_capacity(tail.len() + 2);
    context.push(PromptMessage::new(
        PromptRole::System,
        system_prompt(level, subject),
    ));
    context.extend(tail.iter().map(PromptMessage::from));
    context.push(PromptMessage::new(PromptRole::User, message));
    context
}
