//! # Preferences
//!
//! Typed key/value storage for small pieces of SDK state. Platform shells
//! back the [`Preferences`] trait with encrypted storage; [`MemoryPreferences`]
//! keeps values in-process.
//!
//! Reads never fail: a missing key, or a key holding a value of another
//! type, yields the caller's default.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Typed key/value store.
pub trait Preferences: Send + Sync {
    /// Get a string value or `default`.
    fn get_string(&self, key: &str, default: &str) -> String;

    /// Store a string value.
    fn set_string(&self, key: &str, value: &str);

    /// Get a 64-bit integer value or `default`.
    fn get_long(&self, key: &str, default: i64) -> i64;

    /// Store a 64-bit integer value.
    fn set_long(&self, key: &str, value: i64);

    /// Get a 32-bit integer value or `default`.
    fn get_int(&self, key: &str, default: i32) -> i32;

    /// Store a 32-bit integer value.
    fn set_int(&self, key: &str, value: i32);

    /// Get a boolean value or `default`.
    fn get_bool(&self, key: &str, default: bool) -> bool;

    /// Store a boolean value.
    fn set_bool(&self, key: &str, value: bool);

    /// Remove a single key.
    fn clear(&self, key: &str);

    /// Remove every key.
    fn clear_all(&self);
}

/// A stored preference value.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Value {
    /// String value.
    String(String),
    /// 64-bit integer value.
    Long(i64),
    /// 32-bit integer value.
    Int(i32),
    /// Boolean value.
    Bool(bool),
}

/// In-memory [`Preferences`] implementation. Clones share storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryPreferences {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, key: &str) -> Option<Value> {
        // a poisoned lock still holds consistent data: writes are single inserts
        let values = self.values.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn write(&self, key: &str, value: Value) {
        let mut values = self.values.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_string(), value);
    }
}

impl Preferences for MemoryPreferences {
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.read(key) {
            Some(Value::String(value)) => value,
            _ => default.to_string(),
        }
    }

    fn set_string(&self, key: &str, value: &str) {
        self.write(key, Value::String(value.to_string()));
    }

    fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.read(key) {
            Some(Value::Long(value)) => value,
            _ => default,
        }
    }

    fn set_long(&self, key: &str, value: i64) {
        self.write(key, Value::Long(value));
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.read(key) {
            Some(Value::Int(value)) => value,
            _ => default,
        }
    }

    fn set_int(&self, key: &str, value: i32) {
        self.write(key, Value::Int(value));
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.read(key) {
            Some(Value::Bool(value)) => value,
            _ => default,
        }
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.write(key, Value::Bool(value));
    }

    fn clear(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.remove(key);
    }

    fn clear_all(&self) {
        let mut values = self.values.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.clear();
    }
}
