//! Three-tier variable storage attached to every ability instance.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifetime of a stored variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Survives across game sessions; persisted through the data store.
    Permanent,
    /// Lives for one game, memory only.
    Session,
    /// Bound to a turn number and purged once that turn's cleanup runs.
    Turn(u32),
}

pub type VarMap = BTreeMap<String, Value>;

/// Ability-private state. Snapshots copy it wholesale, so rolling back a turn
/// also rolls back what abilities remembered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopedVars {
    permanent: VarMap,
    session: VarMap,
    turn: BTreeMap<u32, VarMap>,
}

impl ScopedVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `key`, falling back to `default` when the key is missing or holds
    /// a value of another shape.
    pub fn get<T: DeserializeOwned>(&self, scope: Scope, key: &str, default: T) -> T {
        self.raw(scope, key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or(default)
    }

    pub fn raw(&self, scope: Scope, key: &str) -> Option<&Value> {
        match scope {
            Scope::Permanent => self.permanent.get(key),
            Scope::Session => self.session.get(key),
            Scope::Turn(turn) => self.turn.get(&turn).and_then(|vars| vars.get(key)),
        }
    }

    pub fn set(&mut self, scope: Scope, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match scope {
            Scope::Permanent => self.permanent.insert(key, value),
            Scope::Session => self.session.insert(key, value),
            Scope::Turn(turn) => self.turn.entry(turn).or_default().insert(key, value),
        };
    }

    pub fn remove(&mut self, scope: Scope, key: &str) -> Option<Value> {
        match scope {
            Scope::Permanent => self.permanent.remove(key),
            Scope::Session => self.session.remove(key),
            Scope::Turn(turn) => {
                let vars = self.turn.get_mut(&turn)?;
                let removed = vars.remove(key);
                if vars.is_empty() {
                    self.turn.remove(&turn);
                }
                removed
            }
        }
    }

    /// Drops every turn-scoped entry for `turn` and earlier.
    pub fn purge_turns_through(&mut self, turn: u32) {
        self.turn.retain(|&t, _| t > turn);
    }

    pub fn permanent(&self) -> &VarMap {
        &self.permanent
    }

    /// Replaces the permanent tier with values loaded from storage.
    pub fn load_permanent(&mut self, vars: VarMap) {
        self.permanent = vars;
    }

    pub fn has_turn_vars(&self) -> bool {
        !self.turn.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_return_the_default() {
        let vars = ScopedVars::new();
        assert_eq!(vars.get(Scope::Session, "hits", 7u32), 7);
        assert!(!vars.get(Scope::Permanent, "unlocked", false));
        assert_eq!(vars.get(Scope::Turn(3), "sparks", 0i32), 0);
    }

    #[test]
    fn mismatched_types_fall_back_too() {
        let mut vars = ScopedVars::new();
        vars.set(Scope::Session, "mode", "fury");
        assert_eq!(vars.get(Scope::Session, "mode", 1u32), 1);
        assert_eq!(vars.get(Scope::Session, "mode", String::new()), "fury");
    }

    #[test]
    fn scopes_are_independent() {
        let mut vars = ScopedVars::new();
        vars.set(Scope::Permanent, "n", 1);
        vars.set(Scope::Session, "n", 2);
        vars.set(Scope::Turn(4), "n", 3);

        assert_eq!(vars.get(Scope::Permanent, "n", 0), 1);
        assert_eq!(vars.get(Scope::Session, "n", 0), 2);
        assert_eq!(vars.get(Scope::Turn(4), "n", 0), 3);
        assert_eq!(vars.get(Scope::Turn(5), "n", 0), 0);
    }

    #[test]
    fn purge_only_drops_finished_turns() {
        let mut vars = ScopedVars::new();
        vars.set(Scope::Turn(1), "a", true);
        vars.set(Scope::Turn(2), "a", true);
        vars.set(Scope::Turn(3), "a", true);

        vars.purge_turns_through(2);
        assert!(!vars.get(Scope::Turn(1), "a", false));
        assert!(!vars.get(Scope::Turn(2), "a", false));
        assert!(vars.get(Scope::Turn(3), "a", false));
    }

    #[test]
    fn removing_last_turn_key_drops_the_bucket() {
        let mut vars = ScopedVars::new();
        vars.set(Scope::Turn(1), "a", 1);
        assert_eq!(vars.remove(Scope::Turn(1), "a"), Some(Value::from(1)));
        assert!(!vars.has_turn_vars());
    }
}
