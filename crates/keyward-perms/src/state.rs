//! The policy tree: origin -> decision -> operation type -> grant.
//!
//! [`PolicyTable`] is the pure, in-memory form of the stored `policies`
//! value. It owns the tree exclusively; readers get flattened snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grant::{Conditions, Decision, GrantRecord, PermissionGrant};

type DecisionMap = BTreeMap<Decision, BTreeMap<String, GrantRecord>>;

/// All grants, keyed by `(origin, decision, operation type)`.
///
/// At most one grant exists per key; inserting again replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTable {
    origins: BTreeMap<String, DecisionMap>,
}

impl PolicyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the table holds no grants.
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Number of grants.
    pub fn len(&self) -> usize {
        self.origins
            .values()
            .flat_map(|decisions| decisions.values())
            .map(BTreeMap::len)
            .sum()
    }

    /// Insert or replace a grant.
    pub fn insert(
        &mut self,
        origin: impl Into<String>,
        decision: Decision,
        operation_type: impl Into<String>,
        conditions: Conditions,
        created_at: i64,
    ) {
        self.origins
            .entry(origin.into())
            .or_default()
            .entry(decision)
            .or_default()
            .insert(
                operation_type.into(),
                GrantRecord {
                    conditions,
                    created_at,
                },
            );
    }

    /// Look up one grant.
    pub fn get(&self, origin: &str, decision: Decision, operation_type: &str) -> Option<&GrantRecord> {
        self.origins
            .get(origin)?
            .get(&decision)?
            .get(operation_type)
    }

    /// Remove exactly one grant. Returns whether anything was removed.
    ///
    /// Parent levels left empty are pruned. Removing a missing grant is a no-op.
    pub fn revoke(&mut self, origin: &str, decision: Decision, operation_type: &str) -> bool {
        let Some(decisions) = self.origins.get_mut(origin) else {
            return false;
        };
        let Some(types) = decisions.get_mut(&decision) else {
            return false;
        };
        let removed = types.remove(operation_type).is_some();

        if types.is_empty() {
            decisions.remove(&decision);
        }
        if decisions.is_empty() {
            self.origins.remove(origin);
        }
        removed
    }

    /// Flatten into a list, ordered by origin, then decision, then operation type.
    pub fn flatten(&self) -> Vec<PermissionGrant> {
        self.origins
            .iter()
            .flat_map(|(origin, decisions)| {
                decisions.iter().flat_map(move |(decision, types)| {
                    types.iter().map(move |(operation_type, record)| PermissionGrant {
                        origin: origin.clone(),
                        decision: *decision,
                        operation_type: operation_type.clone(),
                        conditions: record.conditions.clone(),
                        granted_at: record.created_at,
                    })
                })
            })
            .collect()
    }

    /// The stored decision for a request, if any grant applies.
    ///
    /// A matching deny wins over a matching allow.
    pub fn decision_for(&self, origin: &str, operation_type: &str, kind: Option<u32>) -> Option<Decision> {
        [Decision::Deny, Decision::Allow]
            .into_iter()
            .find(|decision| {
                self.get(origin, *decision, operation_type)
                    .is_some_and(|record| record.conditions.matches(kind))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> PolicyTable {
        let mut table = PolicyTable::new();
        table.insert("https://a.example", Decision::Allow, "getPublicKey", Conditions::always(), 10);
        table.insert("https://a.example", Decision::Allow, "signEvent", Conditions::kinds([1]), 20);
        table.insert("https://a.example", Decision::Deny, "signEvent", Conditions::kinds([4]), 30);
        table.insert("https://b.example", Decision::Deny, "nip04.decrypt", Conditions::always(), 40);
        table
    }

    #[test]
    fn test_storage_shape_roundtrip() {
        let raw = json!({
            "https://a.example": {
                "true": {
                    "signEvent": {"conditions": {"kinds": {"1": true}}, "created_at": 20}
                },
                "false": {
                    "getPublicKey": {"conditions": {}, "created_at": 5}
                }
            }
        });

        let table: PolicyTable = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("https://a.example", Decision::Allow, "signEvent").unwrap().created_at,
            20
        );
        assert_eq!(serde_json::to_value(&table).unwrap(), raw);
    }

    #[test]
    fn test_flatten() {
        let grants = sample().flatten();
        assert_eq!(grants.len(), 4);
        assert_eq!(grants[0].origin, "https://a.example");
        assert_eq!(grants[0].decision, Decision::Allow);
        assert_eq!(grants[0].operation_type, "getPublicKey");
        assert_eq!(grants[3].origin, "https://b.example");
    }

    #[test]
    fn test_insert_last_write_wins() {
        let mut table = sample();
        table.insert("https://a.example", Decision::Allow, "signEvent", Conditions::always(), 99);
        assert_eq!(table.len(), 4);

        let record = table.get("https://a.example", Decision::Allow, "signEvent").unwrap();
        assert_eq!(record.created_at, 99);
        assert!(record.conditions.is_always());
    }

    #[test]
    fn test_revoke_exact_leaf() {
        let mut table = sample();
        assert!(table.revoke("https://a.example", Decision::Allow, "signEvent"));

        assert!(table.get("https://a.example", Decision::Allow, "signEvent").is_none());
        assert!(table.get("https://a.example", Decision::Deny, "signEvent").is_some());
        assert!(table.get("https://a.example", Decision::Allow, "getPublicKey").is_some());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_revoke_prunes_empty_levels() {
        let mut table = sample();
        assert!(table.revoke("https://b.example", Decision::Deny, "nip04.decrypt"));
        assert!(!serde_json::to_value(&table)
            .unwrap()
            .as_object()
            .unwrap()
            .contains_key("https://b.example"));
    }

    #[test]
    fn test_revoke_missing_is_noop() {
        let mut table = sample();
        let before = table.clone();
        assert!(!table.revoke("https://z.example", Decision::Allow, "signEvent"));
        assert!(!table.revoke("https://b.example", Decision::Allow, "nip04.decrypt"));
        assert!(!table.revoke("https://a.example", Decision::Allow, "nip44.encrypt"));
        assert_eq!(table, before);
    }

    #[test]
    fn test_decision_for() {
        let table = sample();
        assert_eq!(
            table.decision_for("https://a.example", "signEvent", Some(1)),
            Some(Decision::Allow)
        );
        assert_eq!(
            table.decision_for("https://a.example", "signEvent", Some(4)),
            Some(Decision::Deny)
        );
        assert_eq!(table.decision_for("https://a.example", "signEvent", Some(7)), None);
        assert_eq!(
            table.decision_for("https://a.example", "getPublicKey", None),
            Some(Decision::Allow)
        );
        assert_eq!(table.decision_for("https://c.example", "getPublicKey", None), None);
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let mut table = PolicyTable::new();
        table.insert("o", Decision::Allow, "signEvent", Conditions::always(), 1);
        table.insert("o", Decision::Deny, "signEvent", Conditions::always(), 2);
        assert_eq!(table.decision_for("o", "signEvent", Some(1)), Some(Decision::Deny));
    }

    fn origin() -> impl Strategy<Value = String> {
        "https://[a-c]\\.example"
    }

    fn op_type() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("getPublicKey".to_string()),
            Just("signEvent".to_string()),
            Just("nip04.encrypt".to_string()),
        ]
    }

    fn decision() -> impl Strategy<Value = Decision> {
        prop_oneof![Just(Decision::Allow), Just(Decision::Deny)]
    }

    proptest! {
        #[test]
        fn test_revoke_idempotent(
            grants in prop::collection::vec((origin(), decision(), op_type(), 0i64..1000), 0..20),
            target in (origin(), decision(), op_type()),
        ) {
            let mut table = PolicyTable::new();
            for (o, d, t, at) in grants {
                table.insert(o, d, t, Conditions::always(), at);
            }

            let (o, d, t) = target;
            let mut once = table.clone();
            once.revoke(&o, d, &t);
            let mut twice = once.clone();
            let removed_again = twice.revoke(&o, d, &t);

            prop_assert!(!removed_again);
            prop_assert_eq!(once.flatten(), twice.flatten());
            prop_assert!(once.get(&o, d, &t).is_none());
        }

        #[test]
        fn test_flatten_len_matches(
            grants in prop::collection::vec((origin(), decision(), op_type(), 0i64..1000), 0..20),
        ) {
            let mut table = PolicyTable::new();
            for (o, d, t, at) in grants {
                table.insert(o, d, t, Conditions::always(), at);
            }
            prop_assert_eq!(table.flatten().len(), table.len());
        }
    }
}
