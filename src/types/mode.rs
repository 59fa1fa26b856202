//! Connection mode types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, ShotcacheError};

/// Which collaborators a coordinator consults for a `find` call.
///
/// The mode is chosen at construction. The only runtime transition is
/// `Cached → Direct`, taken once the fast store has failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConnectionMode {
    /// Bypass the fast store and always query the remote service.
    ///
    /// For callers that need up-to-date data. Use sparingly.
    Direct = 0,

    /// Consult the fast store first, fall back to the remote service on a
    /// miss and write the result back.
    ///
    /// This is the default.
    #[default]
    Cached = 1,

    /// Only consult the fast store; a miss yields an empty result.
    ///
    /// Fast but possibly stale. Suits slowly changing data such as lists
    /// of file types or projects.
    Local = 2,
}

impl ConnectionMode {
    /// All modes, in declaration order.
    pub const ALL: [ConnectionMode; 3] = [Self::Direct, Self::Cached, Self::Local];

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Cached => "cached",
            Self::Local => "local",
        }
    }

    /// Whether this mode reads from the fast store.
    pub fn uses_store(&self) -> bool {
        matches!(self, Self::Cached | Self::Local)
    }

    /// Whether this mode may contact the remote service.
    pub fn uses_remote(&self) -> bool {
        matches!(self, Self::Direct | Self::Cached)
    }

    pub(crate) fn from_repr(value: u8) -> Self {
        match value {
            0 => Self::Direct,
            1 => Self::Cached,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionMode {
    type Err = ShotcacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "cached" => Ok(Self::Cached),
            "local" => Ok(Self::Local),
            other => Err(ShotcacheError::Configuration(format!(
                "unknown connection mode '{other}' (expected direct, cached or local)"
            ))),
        }
    }
}
