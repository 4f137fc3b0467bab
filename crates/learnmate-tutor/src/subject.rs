//! Academic subjects and keyword-based subject detection.

use serde::{Deserialize, Serialize};

/// A closed set of academic subjects the tutor recognizes.
///
/// Declaration order matters: it is the tie-break order for
/// [`detect`] and the listing order of the subject catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Algebra, calculus, geometry, statistics.
    Mathematics,
    /// Mechanics, energy, electricity, waves.
    Physics,
    /// Atoms, molecules, reactions.
    Chemistry,
    /// Cells, genetics, ecosystems.
    Biology,
    /// Programming, algorithms, databases.
    ComputerScience,
    /// Grammar, writing, literature.
    English,
    /// Historical periods and events.
    History,
    /// Places, climate, maps.
    Geography,
}

impl Subject {
    /// Every subject, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Mathematics,
        Self::Physics,
        Self::Chemistry,
        Self::Biology,
        Self::ComputerScience,
        Self::English,
        Self::History,
        Self::Geography,
    ];

    /// Returns the wire identifier of this subject (e.g. `computer_science`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mathematics => "mathematics",
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::Biology => "biology",
            Self::ComputerScience => "computer_science",
            Self::English => "english",
            Self::History => "history",
            Self::Geography => "geography",
        }
    }

    /// Returns the lower-case keywords that indicate this subject.
    #[must_use]
    pub const fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Mathematics => &[
                "math",
                "algebra",
                "calculus",
                "geometry",
                "trigonometry",
                "statistics",
                "equation",
                "formula",
                "solve",
                "calculate",
            ],
            Self::Physics => &[
                "physics",
                "force",
                "energy",
                "motion",
                "gravity",
                "electricity",
                "magnetism",
                "wave",
                "quantum",
            ],
            Self::Chemistry => &[
                "chemistry",
                "atom",
                "molecule",
                "reaction",
                "element",
                "compound",
                "bond",
                "acid",
                "base",
            ],
            Self::Biology => &[
                "biology",
                "cell",
                "dna",
                "gene",
                "evolution",
                "organism",
                "ecosystem",
                "photosynthesis",
            ],
            Self::ComputerScience => &[
                "programming",
                "algorithm",
                "code",
                "software",
                "python",
                "javascript",
                "database",
                "computer",
            ],
            Self::English => &[
                "grammar",
                "writing",
                "literature",
                "essay",
                "poem",
                "novel",
                "author",
                "reading",
            ],
            Self::History => &[
                "history",
                "war",
                "ancient",
                "medieval",
                "revolution",
                "empire",
                "civilization",
                "historical",
            ],
            Self::Geography => &[
                "geography",
                "continent",
                "country",
                "climate",
                "map",
                "ocean",
                "mountain",
                "river",
            ],
        }
    }

    /// Scores a lower-cased message against this subject's keywords.
    ///
    /// Every substring occurrence of every keyword adds one to the score,
    /// except occurrences lying inside a longer keyword of any subject
    /// ("base" in "database", "evolution" in "revolution").
    #[must_use]
    pub fn score(&self, lowered: &str) -> usize {
        keyword_hits(lowered)
            .iter()
            .filter(|hit| hit.subject == *self)
            .count()
    }

    /// Resolves a client-supplied subject hint.
    ///
    /// Accepts wire identifiers and a few common spellings, ignoring case
    /// and surrounding whitespace. Returns `None` for anything else.
    #[must_use]
    pub fn from_hint(hint: &str) -> Option<Self> {
        let normalized = hint.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "mathematics" | "math" | "maths" => Some(Self::Mathematics),
            "physics" => Some(Self::Physics),
            "chemistry" => Some(Self::Chemistry),
            "biology" => Some(Self::Biology),
            "computer_science" | "cs" | "computing" | "programming" => {
                Some(Self::ComputerScience)
            }
            "english" => Some(Self::English),
            "history" => Some(Self::History),
            "geography" => Some(Self::Geography),
            _ => None,
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One keyword occurrence in a lower-cased message.
#[derive(Debug, Clone, Copy)]
struct KeywordHit {
    subject: Subject,
    start: usize,
    end: usize,
}

impl KeywordHit {
    /// Returns `true` if this hit is longer than `other` and spans it.
    const fn covers(&self, other: &Self) -> bool {
        self.end - self.start > other.end - other.start
            && self.start <= other.start
            && other.end <= self.end
    }
}

/// Finds every keyword occurrence not covered by a longer one.
fn keyword_hits(lowered: &str) -> Vec<KeywordHit> {
    let all: Vec<KeywordHit> = Subject::ALL
        .into_iter()
        .flat_map(|subject| {
            subject.keywords().iter().flat_map(move |keyword| {
                lowered
                    .match_indices(*keyword)
                    .map(move |(start, found)| KeywordHit {
                        subject,
                        start,
                        end: start + found.len(),
                    })
            })
        })
        .collect();

    all.iter()
        .filter(|hit| !all.iter().any(|other| other.covers(hit)))
        .copied()
        .collect()
}

/// Detects the subject of a message by keyword counting.
///
/// Returns the subject with the highest score. Ties go to the subject
/// declared first in [`Subject::ALL`]. Returns `None` when no keyword
/// occurs in the message.
#[must_use]
pub fn detect(message: &str) -> Option<Subject> {
    let hits = keyword_hits(&message.to_lowercase());

    let mut best: Option<(Subject, usize)> = None;
    for subject in Subject::ALL {
        let score = hits.iter().filter(|hit| hit.subject == subject).count();
        if score == 0 {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((subject, score));
        }
    }

    best.map(|(subject, _)| subject)
}
