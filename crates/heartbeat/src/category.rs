//! Activity categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of activity a heartbeat records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "coding")]
    Coding,

    #[serde(rename = "browsing")]
    Browsing,

    #[serde(rename = "building")]
    Building,

    #[serde(rename = "code reviewing")]
    CodeReviewing,

    #[serde(rename = "debugging")]
    Debugging,

    #[serde(rename = "designing")]
    Designing,

    #[serde(rename = "indexing")]
    Indexing,

    #[serde(rename = "manual testing")]
    ManualTesting,

    #[serde(rename = "running tests")]
    RunningTests,

    #[serde(rename = "writing tests")]
    WritingTests,
}

/// Raised when parsing an unknown category string
#[derive(Debug, Error)]
#[error("invalid category {0:?}")]
pub struct ParseCategoryError(pub String);

impl Category {
    /// The wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::Browsing => "browsing",
            Self::Building => "building",
            Self::CodeReviewing => "code reviewing",
            Self::Debugging => "debugging",
            Self::Designing => "designing",
            Self::Indexing => "indexing",
            Self::ManualTesting => "manual testing",
            Self::RunningTests => "running tests",
            Self::WritingTests => "writing tests",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coding" => Ok(Self::Coding),
            "browsing" => Ok(Self::Browsing),
            "building" => Ok(Self::Building),
            "code reviewing" => Ok(Self::CodeReviewing),
            "debugging" => Ok(Self::Debugging),
            "designing" => Ok(Self::Designing),
            "indexing" => Ok(Self::Indexing),
            "manual testing" => Ok(Self::ManualTesting),
            "running tests" => Ok(Self::RunningTests),
            "writing tests" => Ok(Self::WritingTests),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}
