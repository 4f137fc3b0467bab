//! Keyword gate that keeps conversations on educational topics.

use chrono::Utc;

use crate::models::TutorResponse;

/// Lower-case phrases that mark a message as off-topic.
pub const NON_EDUCATIONAL_KEYWORDS: &[&str] = &[
    "weather",
    "sports",
    "entertainment",
    "gossip",
    "personal problems",
    "relationship",
    "dating",
    "politics",
    "religion",
    "gambling",
];

/// Answer returned for off-topic messages.
pub const REDIRECT_MESSAGE: &str = "I'm here to help with your studies and learning! Let's focus on educational topics. Is there something specific you'd like to learn about today? 📚";

/// Follow-up prompts attached to the redirect answer.
pub const REDIRECT_SUGGESTIONS: [&str; 2] = [
    "Ask about mathematics, science, or any academic subject",
    "Request help with homework or study techniques",
];

/// Returns `false` iff the message contains a denylisted phrase.
#[must_use]
pub fn is_educational(message: &str) -> bool {
    let lowered = message.to_lowercase();
    !NON_EDUCATIONAL_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Builds the fixed redirect-to-education response.
#[must_use]
pub fn redirect_response() -> TutorResponse {
    TutorResponse {
        response: REDIRECT_MESSAGE.to_string(),
        suggestions: REDIRECT_SUGGESTIONS.iter().map(ToString::to_string).collect(),
        subject_detected: None,
        confidence: 1.0,
        timestamp: Utc::now(),
    }
}
