use crate::error::BacklogError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Backlog,
    Planning,
    Active,
    Review,
    Testing,
    Complete,
    Deprecated,
}

impl Status {
    pub fn all() -> &'static [Status] {
        &[
            Status::Backlog,
            Status::Planning,
            Status::Active,
            Status::Review,
            Status::Testing,
            Status::Complete,
            Status::Deprecated,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Backlog => "backlog",
            Status::Planning => "planning",
            Status::Active => "active",
            Status::Review => "review",
            Status::Testing => "testing",
            Status::Complete => "complete",
            Status::Deprecated => "deprecated",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Status::Backlog => "📝",
            Status::Planning => "🔍",
            Status::Active => "🔨",
            Status::Review => "👀",
            Status::Testing => "🧪",
            Status::Complete => "✅",
            Status::Deprecated => "❓",
        }
    }

    pub fn is_complete(self) -> bool {
        self == Status::Complete
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = BacklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| BacklogError::InvalidStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Priority::Critical => "🔥",
            Priority::High => "⚡",
            Priority::Medium => "➡️",
            Priority::Low => "⬇️",
        }
    }

    /// Numeric urgency used by the issue tracker, 1 being most urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = BacklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(BacklogError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Level (business value, technical complexity)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    High,
    #[default]
    Medium,
    Low,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = BacklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Level::High),
            "medium" => Ok(Level::Medium),
            "low" => Ok(Level::Low),
            _ => Err(BacklogError::InvalidLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parses_every_variant() {
        for &st in Status::all() {
            assert_eq!(Status::from_str(st.as_str()).unwrap(), st);
        }
        assert!(Status::from_str("done").is_err());
        assert!(Status::from_str("Backlog").is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Complete).unwrap(), "\"complete\"");
    }

    #[test]
    fn priority_ranks() {
        assert_eq!(Priority::Critical.rank(), 1);
        assert_eq!(Priority::High.rank(), 2);
        assert_eq!(Priority::Medium.rank(), 3);
        assert_eq!(Priority::Low.rank(), 4);
    }

    #[test]
    fn invalid_priority_and_level() {
        assert!(matches!(
            Priority::from_str("urgent"),
            Err(BacklogError::InvalidPriority(_))
        ));
        assert!(matches!(Level::from_str("extreme"), Err(BacklogError::InvalidLevel(_))));
    }

    #[test]
    fn title_case_matches_display_rules() {
        assert_eq!(title_case("backlog"), "Backlog");
        assert_eq!(title_case("in progress"), "In Progress");
        assert_eq!(title_case("HIGH"), "High");
        assert_eq!(title_case("re-open"), "Re-Open");
        assert_eq!(title_case(""), "");
    }
}
