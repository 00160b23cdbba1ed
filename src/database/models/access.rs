use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user holds inside a workspace. Ordered: owner > admin > member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Owner,
    Admin,
    #[default]
    Member,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Owner => "owner",
            AccessLevel::Admin => "admin",
            AccessLevel::Member => "member",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            AccessLevel::Owner => 3,
            AccessLevel::Admin => 2,
            AccessLevel::Member => 1,
        }
    }

    /// Parse an optional request value; blank means the default level.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, UnknownAccessLevel> {
        match value.map(str::trim) {
            None | Some("") => Ok(AccessLevel::default()),
            Some(v) => v.parse(),
        }
    }
}

impl PartialOrd for AccessLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccessLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access level: {0}")]
pub struct UnknownAccessLevel(pub String);

impl FromStr for AccessLevel {
    type Err = UnknownAccessLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "owner" => Ok(AccessLevel::Owner),
            "admin" => Ok(AccessLevel::Admin),
            "member" => Ok(AccessLevel::Member),
            other => Err(UnknownAccessLevel(other.to_string())),
        }
    }
}
