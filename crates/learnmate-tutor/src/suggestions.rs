//! Canned follow-up prompts attached to tutor answers.

use crate::subject::Subject;

/// Maximum number of suggestions attached to one answer.
pub const MAX_SUGGESTIONS: usize = 2;

/// Prompts used when a subject has no list of its own.
pub const GENERIC_SUGGESTIONS: &[&str] = &[
    "Would you like me to explain this concept differently?",
    "Do you have any follow-up questions?",
    "Would you like to see a practice problem?",
    "Should we explore related topics?",
];

const MATHEMATICS_SUGGESTIONS: &[&str] = &[
    "Would you like to see step-by-step solving examples?",
    "Should we practice with similar problems?",
    "Would you like to learn about related mathematical concepts?",
];

const SCIENCE_SUGGESTIONS: &[&str] = &[
    "Would you like to see real-world applications?",
    "Should we explore the underlying principles?",
    "Would you like to learn about related scientific phenomena?",
];

const COMPUTER_SCIENCE_SUGGESTIONS: &[&str] = &[
    "Would you like to see code examples?",
    "Should we walk through the algorithm step by step?",
    "Would you like to learn about related programming concepts?",
];

/// Returns the subject's own prompt list, if it has one.
///
/// The natural sciences share one list.
#[must_use]
pub const fn subject_suggestions(subject: Subject) -> Option<&'static [&'static str]> {
    match subject {
        Subject::Mathematics => Some(MATHEMATICS_SUGGESTIONS),
        Subject::Physics | Subject::Chemistry | Subject::Biology => Some(SCIENCE_SUGGESTIONS),
        Subject::ComputerScience => Some(COMPUTER_SCIENCE_SUGGESTIONS),
        Subject::English | Subject::History | Subject::Geography => None,
    }
}

/// Picks follow-up prompts for an answer.
///
/// The answer text is not inspected; the first [`MAX_SUGGESTIONS`] entries
/// of the subject's list (or the generic list) are returned.
#[must_use]
pub fn suggestions(_response_text: &str, subject: Option<Subject>) -> Vec<String> {
    subject
        .and_then(subject_suggestions)
        .unwrap_or(GENERIC_SUGGESTIONS)
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(ToString::to_string)
        .collect()
}
