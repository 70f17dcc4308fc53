//! Decorator that puts the read and write paths around a host field store.

use crate::cipher::FieldCipher;
use crate::classifier::FieldConfig;
use crate::crypt::{FieldCrypt, Outcome};
use crate::Record;
use serde_json::Value;

/// Plain field storage owned by the host record system.
pub trait FieldStore {
    /// Returns the stored value of `field`.
    fn raw_get(&self, field: &str) -> Option<&Value>;

    /// Stores `value` under `field`, replacing any previous value.
    fn raw_set(&mut self, field: &str, value: Value);

    /// Returns every stored field in order.
    fn raw_fields(&self) -> &Record;
}

impl FieldStore for Record {
    fn raw_get(&self, field: &str) -> Option<&Value> {
        self.get(field)
    }

    fn raw_set(&mut self, field: &str, value: Value) {
        self.insert(field.to_string(), value);
    }

    fn raw_fields(&self) -> &Record {
        self
    }
}

/// A host store whose configured fields are encrypted at rest.
///
/// Assignments go through the write path before reaching the store; reads
/// and exports go through the read path after leaving it.
///
/// # Example
///
/// ```
/// use elocrypt::prelude::*;
/// use serde_json::json;
///
/// let cipher = AeadCipher::new(EncryptionKey::generate(), CipherMode::default());
/// let config = FieldConfig::new(["email"]);
/// let mut user = EncryptedRecord::new(Record::new(), config, FieldCrypt::new(cipher));
///
/// user.set("name", json!("Alice"));
/// user.set("email", json!("alice@example.com"));
///
/// assert!(is_tagged(&user.raw()["email"]));
/// assert_eq!(user.get("email"), Some(json!("alice@example.com")));
/// ```
pub struct EncryptedRecord<S: FieldStore, C: FieldCipher> {
    store: S,
    config: FieldConfig,
    crypt: FieldCrypt<C>,
}

impl<S: FieldStore, C: FieldCipher> EncryptedRecord<S, C> {
    /// Wraps `store` with the given configuration and interceptor.
    pub const fn new(store: S, config: FieldConfig, crypt: FieldCrypt<C>) -> Self {
        Self { store, config, crypt }
    }

    /// Assigns `value` to `field`, encrypting it when configured.
    ///
    /// Returns the write [`Outcome`] so callers can notice a fallback.
    pub fn set(&mut self, field: &str, value: Value) -> Outcome {
        let outcome = self.crypt.encrypt_field(field, value, &self.config);
        self.store.raw_set(field, outcome.value().clone());
        outcome
    }

    /// Reads `field`, decrypting it when tagged.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.store
            .raw_get(field)
            .map(|stored| self.crypt.on_field_get(field, stored.clone(), &self.config))
    }

    /// Materializes every field with decrypted values, in stored order.
    pub fn to_exposed(&self) -> Record {
        self.crypt.on_fields_export(self.store.raw_fields(), &self.config)
    }

    /// Returns the field configuration.
    pub const fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Returns the underlying store with values as persisted.
    pub const fn raw(&self) -> &S {
        &self.store
    }

    /// Unwraps the decorator, returning the store.
    pub fn into_inner(self) -> S {
        self.store
    }
}
