//! Case values
//!
//! A case is a named invocation of a command. The same `(name, command)` pair
//! may live independently in the case store, the favorites and the history;
//! each store owns its own copy and tags it with a [`CaseRole`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Serialized form of a case, shared by every persisted section
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseData {
    pub case_name: String,
    pub case_command: String,
}

impl CaseData {
    pub fn new(case_name: impl Into<String>, case_command: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            case_command: case_command.into(),
        }
    }
}

/// Where a case is presented from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseRole {
    #[default]
    Plain,
    Favorite,
    LastTask,
}

impl CaseRole {
    /// Context value handed to the tree surface
    pub fn context_value(&self) -> &'static str {
        match self {
            Self::Plain => "uvCase",
            Self::Favorite => "favoriteCase",
            Self::LastTask => "lastTask",
        }
    }
}

/// A named, runnable invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub name: String,
    pub command: String,
    pub role: CaseRole,
}

impl Case {
    /// Create a plain case
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            role: CaseRole::Plain,
        }
    }

    /// The default case synthesized for a command with no cases
    pub fn help_for(command_label: &str) -> Self {
        Self::new("--help", format!("{} --help", command_label))
    }

    pub fn with_role(mut self, role: CaseRole) -> Self {
        self.role = role;
        self
    }

    pub fn from_data(data: CaseData, role: CaseRole) -> Self {
        Self {
            name: data.case_name,
            command: data.case_command,
            role,
        }
    }

    pub fn to_data(&self) -> CaseData {
        CaseData::new(self.name.clone(), self.command.clone())
    }

    /// Pair equality, ignoring the role
    pub fn same_pair(&self, other: &Case) -> bool {
        self.name == other.name && self.command == other.command
    }

    /// Case-insensitive substring match on name or command string.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.command.to_lowercase().contains(needle)
    }
}

impl From<CaseData> for Case {
    fn from(data: CaseData) -> Self {
        Self::from_data(data, CaseRole::Plain)
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.command)
    }
}
