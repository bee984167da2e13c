//! Per-run shared key/value store.
//!
//! Any step of a convergence run may write here; the reboot check only
//! reads. Synchronisation is the engine's concern: a `RunState` is handed to
//! the predicate by shared reference and never mutated by it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key set by steps that want the host rebooted before the run continues.
pub const REBOOT_REQUESTED: &str = "reboot_requested";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunState {
    entries: BTreeMap<String, Value>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Record an explicit reboot request.
    pub fn request_reboot(&mut self) {
        self.insert(REBOOT_REQUESTED, true);
    }

    /// Only a JSON `true` counts; any other value, or none, is no request.
    pub fn reboot_requested(&self) -> bool {
        matches!(self.get(REBOOT_REQUESTED), Some(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_state_has_no_request() {
        assert!(!RunState::new().reboot_requested());
    }

    #[test]
    fn test_request_reboot() {
        let mut state = RunState::new();
        state.request_reboot();
        assert!(state.reboot_requested());
        assert_eq!(state.get(REBOOT_REQUESTED), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_non_boolean_values_are_not_requests() {
        let mut state = RunState::new();
        for value in [json!("true"), json!(1), json!(false), json!({"delay": 5})] {
            state.insert(REBOOT_REQUESTED, value.clone());
            assert!(!state.reboot_requested(), "{value} must not count");
        }
    }

    #[test]
    fn test_remove_clears_request() {
        let mut state = RunState::new();
        state.request_reboot();
        assert_eq!(state.remove(REBOOT_REQUESTED), Some(json!(true)));
        assert!(!state.reboot_requested());
    }

    #[test]
    fn test_deserialize_from_json_object() {
        let state: RunState =
            serde_json::from_str(r#"{"reboot_requested": true, "other": [1, 2]}"#).unwrap();
        assert!(state.reboot_requested());
        assert_eq!(state.get("other"), Some(&json!([1, 2])));
    }
}
