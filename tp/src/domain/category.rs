//! Goal and task categories

use serde::{Deserialize, Serialize};

/// Kind of work a task represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Planning,
    Design,
    Development,
    Testing,
    Deployment,
    Marketing,
    #[default]
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Design => "design",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Deployment => "deployment",
            Self::Marketing => "marketing",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(Self::Planning),
            "design" => Ok(Self::Design),
            "development" => Ok(Self::Development),
            "testing" => Ok(Self::Testing),
            "deployment" => Ok(Self::Deployment),
            "marketing" => Ok(Self::Marketing),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown task category: {}", s)),
        }
    }
}

/// Area of life or work a goal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Business,
    Personal,
    Project,
    Learning,
    Health,
    #[default]
    Other,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 6] = [
        Self::Business,
        Self::Personal,
        Self::Project,
        Self::Learning,
        Self::Health,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Personal => "personal",
            Self::Project => "project",
            Self::Learning => "learning",
            Self::Health => "health",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GoalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "business" => Ok(Self::Business),
            "personal" => Ok(Self::Personal),
            "project" => Ok(Self::Project),
            "learning" => Ok(Self::Learning),
            "health" => Ok(Self::Health),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown goal category: {}", s)),
        }
    }
}
