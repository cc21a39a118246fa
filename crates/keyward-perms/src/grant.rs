//! Grant values and their conditions.
//!
//! A grant is an allow or deny decision recorded for one operation type
//! requested by one origin, optionally narrowed by conditions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::PermsError;

/// Whether a grant allows or denies the operation.
///
/// Stored as the map key `"true"` (allow) or `"false"` (deny).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Decision {
    /// The operation is allowed.
    Allow,
    /// The operation is denied.
    Deny,
}

impl Decision {
    /// The storage key for this decision.
    pub const fn as_key(self) -> &'static str {
        match self {
            Decision::Allow => "true",
            Decision::Deny => "false",
        }
    }

    /// Whether this decision allows the operation.
    pub const fn is_allow(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        })
    }
}

impl FromStr for Decision {
    type Err = PermsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" | "allow" => Ok(Decision::Allow),
            "false" | "deny" => Ok(Decision::Deny),
            other => Err(PermsError::InvalidPolicy(format!("unknown decision {other:?}"))),
        }
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_key())
    }
}

impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Conditions that narrow a grant.
///
/// An empty condition set matches every request. Unrecognised condition
/// fields are carried through unchanged so that rewriting the policy tree
/// never drops them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawConditions", into = "RawConditions")]
pub struct Conditions {
    kinds: Option<BTreeSet<u32>>,
    extra: BTreeMap<String, Value>,
}

/// Storage shape: `{"kinds": {"1": true, "7": true}, ...}`.
#[derive(Serialize, Deserialize)]
struct RawConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kinds: Option<BTreeMap<String, bool>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl TryFrom<RawConditions> for Conditions {
    type Error = PermsError;

    fn try_from(raw: RawConditions) -> Result<Self, Self::Error> {
        let kinds = raw
            .kinds
            .map(|kinds| {
                kinds
                    .into_iter()
                    .filter(|(_, enabled)| *enabled)
                    .map(|(kind, _)| {
                        kind.parse::<u32>().map_err(|_| {
                            PermsError::InvalidPolicy(format!("event kind {kind:?} is not a number"))
                        })
                    })
                    .collect::<Result<BTreeSet<_>, _>>()
            })
            .transpose()?;
        Ok(Self {
            kinds,
            extra: raw.extra,
        })
    }
}

impl From<Conditions> for RawConditions {
    fn from(conditions: Conditions) -> Self {
        Self {
            kinds: conditions
                .kinds
                .map(|kinds| kinds.into_iter().map(|k| (k.to_string(), true)).collect()),
            extra: conditions.extra,
        }
    }
}

impl Conditions {
    /// Conditions that match everything.
    pub fn always() -> Self {
        Self::default()
    }

    /// Restrict to a set of event kinds.
    pub fn kinds(kinds: impl IntoIterator<Item = u32>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
            extra: BTreeMap::new(),
        }
    }

    /// The event kinds this grant is restricted to, if any.
    pub fn event_kinds(&self) -> Option<&BTreeSet<u32>> {
        self.kinds.as_ref()
    }

    /// Whether these conditions impose no restriction.
    pub fn is_always(&self) -> bool {
        self.kinds.is_none() && self.extra.is_empty()
    }

    /// Check whether a request for `kind` satisfies these conditions.
    ///
    /// A kind-restricted grant never matches a request that carries no kind.
    pub fn matches(&self, kind: Option<u32>) -> bool {
        match (&self.kinds, kind) {
            (None, _) => true,
            (Some(kinds), Some(kind)) => kinds.contains(&kind),
            (Some(_), None) => false,
        }
    }

    /// Short description: `"kinds: 1, 7"` or `"always"`.
    pub fn describe(&self) -> String {
        match &self.kinds {
            Some(kinds) => format!(
                "kinds: {}",
                kinds
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => "always".to_string(),
        }
    }
}

/// The stored value of one grant leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Conditions narrowing the grant.
    #[serde(default)]
    pub conditions: Conditions,

    /// When the grant was made (Unix seconds).
    pub created_at: i64,
}

/// One grant, flattened out of the policy tree for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    /// The requesting site or application.
    pub origin: String,

    /// Allow or deny.
    pub decision: Decision,

    /// The operation type (e.g. `signEvent`, `getPublicKey`).
    pub operation_type: String,

    /// Conditions narrowing the grant.
    pub conditions: Conditions,

    /// When the grant was made (Unix seconds).
    pub granted_at: i64,
}

impl PermissionGrant {
    /// `granted_at` as `YYYY-MM-DD HH:MM:SS` in UTC.
    pub fn granted_at_display(&self) -> String {
        DateTime::from_timestamp(self.granted_at, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.granted_at.to_string())
    }
}
