use serde::{Deserialize, Serialize};
use std::fmt;

use super::version::VersionKey;

/// Strategy for picking among several candidate revisions of one schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Every component must equal the requested key
    Exact,
    /// Same read version, highest (write, minor)
    Latest,
    /// Same read and write version, minor at least the requested one
    LatestCompatibleWrite,
    /// Same read version, (write, minor) at least the requested one
    LatestCompatibleRead,
}

impl MatchPolicy {
    /// Whether `candidate` satisfies a request for `requested` under this policy.
    ///
    /// Names are compared case-insensitively.
    pub fn matches(&self, requested: &VersionKey, candidate: &VersionKey) -> bool {
        if !candidate.has_name(&requested.name) {
            return false;
        }

        match self {
            MatchPolicy::Exact => {
                candidate.read == requested.read
                    && candidate.write == requested.write
                    && candidate.minor == requested.minor
            }
            MatchPolicy::Latest => candidate.read == requested.read,
            MatchPolicy::LatestCompatibleWrite => {
                candidate.read == requested.read
                    && candidate.write == requested.write
                    && candidate.minor >= requested.minor
            }
            MatchPolicy::LatestCompatibleRead => {
                candidate.read == requested.read
                    && (candidate.write, candidate.minor) >= (requested.write, requested.minor)
            }
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPolicy::Exact => "exact",
            MatchPolicy::Latest => "latest",
            MatchPolicy::LatestCompatibleWrite => "latest-compatible-write",
            MatchPolicy::LatestCompatibleRead => "latest-compatible-read",
        };
        write!(f, "{name}")
    }
}
