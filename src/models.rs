use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Camera angle of a demonstration video
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Side,
    Front,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Side => "side",
            View::Front => "front",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "side" => Ok(View::Side),
            "front" => Ok(View::Front),
            other => Err(format!("Unknown view: {}", other)),
        }
    }
}

/// One video resolved to an exercise and a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedView {
    /// Lowercase hyphenated exercise identifier, e.g. `bench-press`
    pub canonical_key: String,
    pub view: View,
    /// Human-readable name, e.g. `Bench Press`
    pub display_name: String,
    /// Video URL with any fragment removed
    pub url: String,
}

/// A fully paired exercise ready for display
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub name: String,
    pub side_url: String,
    pub front_url: String,
    /// Filled in downstream; always a single blank here
    pub notes: String,
    /// Filled in downstream; always a single blank here
    pub tips: String,
}

/// Placeholder written to `notes` and `tips`
pub const BLANK_PLACEHOLDER: &str = " ";

impl ExerciseRecord {
    pub fn new(name: String, side_url: String, front_url: String) -> Self {
        Self {
            name,
            side_url,
            front_url,
            notes: BLANK_PLACEHOLDER.to_string(),
            tips: BLANK_PLACEHOLDER.to_string(),
        }
    }
}

/// Result of one muscle/gender query
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MuscleExercises {
    /// The muscle exactly as the caller supplied it
    pub muscle: String,
    pub exercises: Vec<ExerciseRecord>,
}
