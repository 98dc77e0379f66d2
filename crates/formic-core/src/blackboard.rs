//! Per-agent key/value store with staged diff and commit semantics.
//!
//! The blackboard is the only channel between sensors, triggers, and steps:
//! sensors write derived facts, triggers read them, steps read them and
//! produce intents. Writes apply immediately and are recorded in a staged
//! change set; [`Blackboard::commit`] promotes them (taking a rollback
//! snapshot) and returns the diff, [`Blackboard::rollback`] restores the
//! last committed state.

use crate::id::{AgentId, GridPos};
use crate::{Value, ValueMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single staged change: the value before the most recent write and the
/// value after it. `new == None` records a key removal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    /// Value before the write, if the key existed.
    pub old: Option<Value>,
    /// Value after the write; `None` if the key was removed.
    pub new: Option<Value>,
}

/// Diff returned by [`Blackboard::commit`]: key → staged change.
pub type BlackboardDiff = IndexMap<String, ValueChange>;

/// Per-agent state store with staged diff tracking.
#[derive(Clone, Debug)]
pub struct Blackboard {
    agent_id: AgentId,
    data: IndexMap<String, Value>,
    committed: IndexMap<String, Value>,
    changes: BlackboardDiff,
}

impl Blackboard {
    /// Create an empty blackboard for `agent_id`.
    ///
    /// The id is mirrored under [`keys::AGENT_ID`](crate::keys::AGENT_ID)
    /// and committed immediately so a fresh blackboard has no pending diff.
    pub fn new(agent_id: AgentId) -> Self {
        let mut bb = Self {
            agent_id,
            data: IndexMap::new(),
            committed: IndexMap::new(),
            changes: IndexMap::new(),
        };
        bb.set(crate::keys::AGENT_ID, Value::from(agent_id.0));
        bb.commit();
        bb
    }

    /// The owning agent's id.
    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// All keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Set `key` to `value`.
    ///
    /// A no-op if the stored value is already equal; otherwise the write
    /// applies immediately and a `{old, new}` entry is staged. Writing the
    /// same key twice before a commit keeps a single entry whose `old` is
    /// the value before the latest write.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if self.data.get(&key) == Some(&value) {
            return;
        }
        let old = self.data.get(&key).cloned();
        self.changes.insert(
            key.clone(),
            ValueChange {
                old,
                new: Some(value.clone()),
            },
        );
        self.data.insert(key, value);
    }

    /// Set many keys at once, in map order.
    pub fn update(&mut self, values: &ValueMap) {
        for (k, v) in values {
            self.set(k.clone(), v.clone());
        }
    }

    /// Remove `key`, staging a removal entry. Returns the removed value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let old = self.data.shift_remove(key)?;
        self.changes.insert(
            key.to_string(),
            ValueChange {
                old: Some(old.clone()),
                new: None,
            },
        );
        Some(old)
    }

    /// The staged change set accumulated since the last commit.
    pub fn diff(&self) -> BlackboardDiff {
        self.changes.clone()
    }

    /// Whether any change is staged.
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Promote staged values: snapshot the current state for rollback,
    /// clear the staged set, and return it.
    ///
    /// Committing twice in a row is idempotent: the second diff is empty.
    pub fn commit(&mut self) -> BlackboardDiff {
        let diff = std::mem::take(&mut self.changes);
        self.committed = self.data.clone();
        diff
    }

    /// Discard staged changes and restore the last committed state.
    pub fn rollback(&mut self) {
        self.data = self.committed.clone();
        self.changes.clear();
    }

    /// Export the full state as a JSON object, e.g. for diagnostics.
    pub fn to_map(&self) -> ValueMap {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    // ── Typed accessors ─────────────────────────────────────────────
    //
    // Plugins and the engine read a handful of shapes constantly; these
    // keep call sites free of serde_json pattern noise.

    /// Read a boolean; `default` if missing or not a bool.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Read an integer; `default` if missing or not an integer.
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    /// Read a non-negative integer clamped to `u32`; `default` if missing.
    pub fn get_u32(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(Value::as_u64)
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(default)
    }

    /// Read a `[x, y]` array as a [`GridPos`].
    pub fn get_pos(&self, key: &str) -> Option<GridPos> {
        let arr = self.get(key)?.as_array()?;
        if arr.len() != 2 {
            return None;
        }
        Some(GridPos::new(
            arr[0].as_i64()? as i32,
            arr[1].as_i64()? as i32,
        ))
    }

    /// Write a [`GridPos`] as a `[x, y]` array.
    pub fn set_pos(&mut self, key: impl Into<String>, pos: GridPos) {
        self.set(key, serde_json::json!([pos.x, pos.y]));
    }
}
