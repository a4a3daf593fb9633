// 🎭 Club Catalog - the fixed set of clubs a student can join
// The identifier is what gets validated and stored; the label is display only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CLUB
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Club {
    Programming,
    Art,
    Sports,
    Music,
    Drama,
}

impl Club {
    /// Every club, in the order the intake form lists them
    pub const ALL: [Club; 5] = [
        Club::Programming,
        Club::Art,
        Club::Sports,
        Club::Music,
        Club::Drama,
    ];

    /// Stored identifier
    pub fn id(&self) -> &'static str {
        match self {
            Club::Programming => "programming",
            Club::Art => "art",
            Club::Sports => "sports",
            Club::Music => "music",
            Club::Drama => "drama",
        }
    }

    /// Human-facing name
    pub fn label(&self) -> &'static str {
        match self {
            Club::Programming => "Programming Club",
            Club::Art => "Art Club",
            Club::Sports => "Sports Club",
            Club::Music => "Music Club",
            Club::Drama => "Drama Club",
        }
    }
}

impl fmt::Display for Club {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when a club identifier is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown club: {0}")]
pub struct UnknownClub(pub String);

impl FromStr for Club {
    type Err = UnknownClub;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Club::ALL
            .iter()
            .copied()
            .find(|club| club.id() == wanted)
            .ok_or_else(|| UnknownClub(s.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
