//! Static subject and study-tip catalogs served to clients.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::subject::Subject;

/// Display metadata for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectInfo {
    /// Human-readable name.
    pub name: &'static str,
    /// Example topics within the subject.
    pub topics: &'static [&'static str],
    /// Emoji icon.
    pub icon: &'static str,
}

/// Returns the catalog entry for a subject.
#[must_use]
pub const fn subject_info(subject: Subject) -> SubjectInfo {
    match subject {
        Subject::Mathematics => SubjectInfo {
            name: "Mathematics",
            topics: &["Algebra", "Calculus", "Geometry", "Statistics", "Trigonometry"],
            icon: "🔢",
        },
        Subject::Physics => SubjectInfo {
            name: "Physics",
            topics: &[
                "Mechanics",
                "Thermodynamics",
                "Electricity",
                "Waves",
                "Quantum Physics",
            ],
            icon: "⚛️",
        },
        Subject::Chemistry => SubjectInfo {
            name: "Chemistry",
            topics: &[
                "Organic Chemistry",
                "Inorganic Chemistry",
                "Physical Chemistry",
                "Biochemistry",
            ],
            icon: "🧪",
        },
        Subject::Biology => SubjectInfo {
            name: "Biology",
            topics: &["Cell Biology", "Genetics", "Evolution", "Ecology", "Physiology"],
            icon: "🧬",
        },
        Subject::ComputerScience => SubjectInfo {
            name: "Computer Science",
            topics: &[
                "Programming",
                "Algorithms",
                "Data Structures",
                "Databases",
                "AI/ML",
            ],
            icon: "💻",
        },
        Subject::English => SubjectInfo {
            name: "English",
            topics: &[
                "Grammar",
                "Literature",
                "Writing",
                "Reading Comprehension",
                "Poetry",
            ],
            icon: "📝",
        },
        Subject::History => SubjectInfo {
            name: "History",
            topics: &[
                "World History",
                "Ancient Civilizations",
                "Modern History",
                "Historical Analysis",
            ],
            icon: "📜",
        },
        Subject::Geography => SubjectInfo {
            name: "Geography",
            topics: &[
                "Physical Geography",
                "Human Geography",
                "Climate",
                "Cartography",
            ],
            icon: "🌍",
        },
    }
}

/// The full subject catalog.
///
/// Serializes as a JSON object keyed by subject identifier, in declaration
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectCatalog;

impl SubjectCatalog {
    /// Iterates over every subject with its metadata.
    pub fn entries() -> impl Iterator<Item = (Subject, SubjectInfo)> {
        Subject::ALL
            .into_iter()
            .map(|subject| (subject, subject_info(subject)))
    }
}

impl Serialize for SubjectCatalog {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Subject::ALL.len()))?;
        for (subject, info) in Self::entries() {
            map.serialize_entry(subject.as_str(), &info)?;
        }
        map.end()
    }
}

/// A general study tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudyTip {
    /// Area of study practice the tip belongs to.
    pub category: &'static str,
    /// The advice.
    pub tip: &'static str,
    /// Emoji icon.
    pub icon: &'static str,
}

/// Study tips, in display order.
pub const STUDY_TIPS: &[StudyTip] = &[
    StudyTip {
        category: "Time Management",
        tip: "Use the Pomodoro Technique: study for 25 minutes, then take a 5-minute break",
        icon: "⏰",
    },
    StudyTip {
        category: "Active Learning",
        tip: "Teach concepts to someone else or explain them out loud to reinforce understanding",
        icon: "🗣️",
    },
    StudyTip {
        category: "Note Taking",
        tip: "Use the Cornell Note-Taking System to organize and review your notes effectively",
        icon: "📝",
    },
    StudyTip {
        category: "Practice",
        tip: "Practice problems regularly instead of just reading; active recall strengthens memory",
        icon: "🎯",
    },
    StudyTip {
        category: "Environment",
        tip: "Create a dedicated, distraction-free study space with good lighting and organization",
        icon: "🏠",
    },
];
