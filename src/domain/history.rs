//! Append-only audit history stored alongside each contract.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Create,
    Update,
}

/// Old and new value of one changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// One immutable audit record.
///
/// `username` is a snapshot taken when the entry was written; renaming or
/// deleting the user later does not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub username: String,
    pub action: HistoryAction,
    #[serde(default)]
    pub changes: BTreeMap<String, FieldChange>,
    pub timestamp: String,
}

impl HistoryEntry {
    #[must_use]
    pub fn created(actor: &Principal, at: DateTime<Utc>) -> Self {
        Self {
            user_id: actor.id,
            username: actor.username.clone(),
            action: HistoryAction::Create,
            changes: BTreeMap::new(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    #[must_use]
    pub fn updated(actor: &Principal, changes: ChangeSet, at: DateTime<Utc>) -> Self {
        Self {
            user_id: actor.id,
            username: actor.username.clone(),
            action: HistoryAction::Update,
            changes: changes.into_inner(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// Collects `{old, new}` pairs for fields whose value actually changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChangeSet(BTreeMap<String, FieldChange>);

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change if `old != new`. Returns whether anything was recorded.
    ///
    /// Values are stored in their JSON form, so dates become ISO-8601 strings.
    pub fn record<T>(&mut self, field: &str, old: &T, new: &T) -> bool
    where
        T: Serialize + PartialEq + ?Sized,
    {
        if old == new {
            return false;
        }

        let old = serde_json::to_value(old).unwrap_or(Value::Null);
        let new = serde_json::to_value(new).unwrap_or(Value::Null);
        self.0.insert(field.to_string(), FieldChange { old, new });
        true
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, FieldChange> {
        self.0
    }
}
