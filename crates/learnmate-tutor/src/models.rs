//! Request and response types exchanged with tutoring clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::subject::Subject;

/// Who authored a message in the client-supplied history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student.
    User,
    /// The tutor.
    Assistant,
}

/// A single message of prior conversation, supplied by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// When the message was sent, if the client tracked it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Creates a student message without a timestamp.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    /// Creates a tutor message without a timestamp.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }
}

/// The student's self-reported proficiency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserLevel {
    /// New to the topic (default).
    #[default]
    Beginner,
    /// Some prior knowledge.
    Intermediate,
    /// Comfortable with the fundamentals.
    Advanced,
}

impl UserLevel {
    /// Returns the lower-case name of this level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Parses a string into a `UserLevel`, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid user level '{s}': expected one of 'beginner', 'intermediate', 'advanced'"
            ))
        })
    }
}

impl Serialize for UserLevel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Request body for `POST /api/tutor/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorRequest {
    /// The student's current message.
    pub message: String,

    /// Prior conversation, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub conversation_history: Vec<ChatMessage>,

    /// Optional subject hint; unknown values are ignored.
    #[serde(default)]
    pub subject: Option<String>,

    /// The student's level.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_level: UserLevel,
}

impl TutorRequest {
    /// Creates a request with no history, no subject hint, and the default level.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_history: Vec::new(),
            subject: None,
            user_level: UserLevel::default(),
        }
    }

    /// Returns `true` if the message is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.message.trim().is_empty()
    }

    /// Returns the subject hint if it names a known subject.
    #[must_use]
    pub fn subject_hint(&self) -> Option<Subject> {
        self.subject.as_deref().and_then(Subject::from_hint)
    }
}

/// Response body for `POST /api/tutor/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorResponse {
    /// The tutor's answer.
    pub response: String,
    /// Up to two follow-up prompts.
    pub suggestions: Vec<String>,
    /// The subject the answer was tailored to.
    pub subject_detected: Option<Subject>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// When the response was produced.
    pub timestamp: DateTime<Utc>,
}

/// Error body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error category.
    pub error: String,
    /// Human-readable description.
    pub message: String,
    /// When the error occurred.
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Creates an error body stamped with the current time.
    #[must_use]
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
