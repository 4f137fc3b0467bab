//! Offline answers used when the completion API cannot be reached.
//!
//! Everything here is a pure function of its input and the static
//! paragraphs below; it is the only answer path while the upstream is down.

use crate::subject::{self, Subject};

/// Notice placed at the start of every offline answer.
pub const OFFLINE_NOTICE: &str = "⚠️ Currently running in offline mode - my advanced AI features will return when connectivity is restored.\n\n";

/// Guidance used when no subject could be identified.
pub const GENERIC_GUIDANCE: &str = "📚 I'm here to help with your learning! My advanced AI features are temporarily unavailable, but I can still offer educational guidance and study tips. Tell me which subject you're working on and I'll do my best to guide your learning.";

/// Returns the canned guidance paragraph for a subject.
#[must_use]
pub const fn subject_guidance(subject: Subject) -> &'static str {
    match subject {
        Subject::Mathematics => "🔢 I'd love to help with your math question! While my advanced AI features are temporarily unavailable, here is some general guidance: break complex problems into smaller steps, write down what you know and what you need to find, and pick the formula or method that connects them. Would you like some math resources or study techniques?",
        Subject::Physics => "⚛️ Great physics question! I'm running in simplified mode, but physics problems usually go well when you draw a diagram, list the known and unknown variables, apply the relevant laws and equations, and check your units at the end. Would you like study tips for your specific physics topic?",
        Subject::Chemistry => "🧪 Chemistry is fascinating! My full AI capabilities are temporarily down, but chemistry success often comes from knowing the periodic table, balancing equations carefully, tracking significant figures, and practicing molecular structures. Which chemistry concept are you working on?",
        Subject::Biology => "🧬 Biology is the study of life! I'm in basic mode right now, but I suggest focusing on key vocabulary, how structure relates to function, biological processes at different scales, and real-world connections. Biology concepts build on each other, so which system or process are you studying?",
        Subject::ComputerScience => "💻 Programming and computer science are exciting! Even in simplified mode I can remind you that good code comes from breaking problems into smaller parts, planning the algorithm first, writing clean code, testing thoroughly, and debugging systematically. Which concept or language are you working with?",
        Subject::English => "📝 Language and literature are rich subjects! My advanced features are temporarily unavailable, but success in English comes from active reading, analyzing themes and literary devices, writing regularly, building vocabulary, and discussing what you read. Which part of English are you exploring?",
        Subject::History => "📜 History helps us understand our world! I'm running in basic mode, but good history study involves building timelines, tracing cause and effect, weighing multiple perspectives, reading primary sources, and connecting the past to the present. Which period or event interests you?",
        Subject::Geography => "🌍 Geography connects the physical and human worlds! Even in simplified mode I can suggest focusing on map skills, the links between physical and human geography, climate patterns, and spatial relationships. Which geographic concept are you studying?",
    }
}

/// Produces the offline answer for the student's last message.
///
/// The subject is re-detected from the message itself; the result always
/// starts with [`OFFLINE_NOTICE`].
#[must_use]
pub fn fallback(last_user_message: &str) -> String {
    let guidance = subject::detect(last_user_message).map_or(GENERIC_GUIDANCE, subject_guidance);

    let mut answer = String::with_capacity(OFFLINE_NOTICE.len() + guidance.len());
    answer.push_str(OFFLINE_NOTICE);
    answer.push_str(guidance);
    answer
}
