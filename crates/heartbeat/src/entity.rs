//! Entity types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a heartbeat's entity refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// A file path on disk (or in an editor buffer for unsaved entities)
    #[default]
    #[serde(rename = "file")]
    File,

    /// A browsed domain
    #[serde(rename = "domain")]
    Domain,

    /// An application name
    #[serde(rename = "app")]
    App,
}

/// Raised when parsing an unknown entity type string
#[derive(Debug, Error)]
#[error("invalid entity type {0:?}")]
pub struct ParseEntityTypeError(pub String);

impl EntityType {
    /// The wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Domain => "domain",
            Self::App => "app",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ParseEntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "domain" => Ok(Self::Domain),
            "app" => Ok(Self::App),
            other => Err(ParseEntityTypeError(other.to_string())),
        }
    }
}
