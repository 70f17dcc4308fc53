//! Encrypt-on-write, decrypt-on-read and export interception.
//!
//! Every operation is a single pure transform of one value (or one mapping)
//! against a read-only [`FieldConfig`] and cipher. Cipher failures never
//! reach the caller: the original value is handed back, the failure is
//! reported to the [`FailureObserver`], and [`Outcome::Fallback`] records
//! that it happened.

use crate::cipher::FieldCipher;
use crate::classifier::{is_encryptable, FieldConfig};
use crate::error::Error;
use crate::observer::{FailureObserver, TracingObserver};
use crate::tag::{is_tagged, tag, untag};
use crate::Record;
use serde_json::Value;
use std::sync::Arc;

/// Result of running one field value through the read or write path.
#[derive(Debug)]
pub enum Outcome {
    /// The value was encrypted and tagged, or untagged and decrypted.
    Transformed(Value),

    /// Nothing to do: field not configured, value already in the target
    /// form, or value not string-shaped.
    Unchanged(Value),

    /// The cipher failed; `value` is the original input, untouched.
    Fallback {
        /// The value handed back to the host.
        value: Value,
        /// The swallowed cipher error.
        error: Error,
    },
}

impl Outcome {
    /// Returns the value to hand back to the host.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Transformed(value) | Self::Unchanged(value) | Self::Fallback { value, .. } => {
                value
            }
        }
    }

    /// Borrows the value to hand back to the host.
    #[must_use]
    pub const fn value(&self) -> &Value {
        match self {
            Self::Transformed(value) | Self::Unchanged(value) | Self::Fallback { value, .. } => {
                value
            }
        }
    }

    /// Returns `true` if the cipher failed and the input was passed through.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Returns `true` if the value was encrypted or decrypted.
    #[must_use]
    pub const fn is_transformed(&self) -> bool {
        matches!(self, Self::Transformed(_))
    }

    /// Returns the swallowed error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Fallback { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Field encryption interceptor.
///
/// Cheap to clone; clones share the cipher and observer.
///
/// # Example
///
/// ```
/// use elocrypt::prelude::*;
/// use serde_json::json;
///
/// let cipher = AeadCipher::new(EncryptionKey::generate(), CipherMode::default());
/// let crypt = FieldCrypt::new(cipher);
/// let config = FieldConfig::new(["secret"]);
///
/// let stored = crypt.on_field_set("secret", json!("hello"), &config);
/// assert!(is_tagged(&stored));
/// assert_eq!(crypt.on_field_get("secret", stored, &config), json!("hello"));
///
/// let plain = crypt.on_field_set("notconfigured", json!("hello"), &config);
/// assert_eq!(plain, json!("hello"));
/// ```
pub struct FieldCrypt<C: FieldCipher> {
    cipher: Arc<C>,
    observer: Arc<dyn FailureObserver>,
}

impl<C: FieldCipher> FieldCrypt<C> {
    /// Creates an interceptor that logs failures through `tracing`.
    pub fn new(cipher: C) -> Self {
        Self { cipher: Arc::new(cipher), observer: Arc::new(TracingObserver) }
    }

    /// Replaces the failure observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FailureObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the underlying cipher.
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Write path, returning the [`Outcome`].
    ///
    /// Strings are encrypted; numbers and booleans are encrypted in their
    /// text form. Null, arrays and objects are left for the host to
    /// serialize first. A value that is already tagged is never encrypted
    /// again.
    pub fn encrypt_field(&self, field: &str, value: Value, config: &FieldConfig) -> Outcome {
        if !is_encryptable(field, config) || is_tagged(&value) {
            return Outcome::Unchanged(value);
        }

        let plaintext = match &value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        };
        let Some(plaintext) = plaintext else {
            tracing::debug!(field, "value is not string-shaped, left unencrypted");
            return Outcome::Unchanged(value);
        };

        match self.cipher.encrypt(&plaintext) {
            Ok(ciphertext) => Outcome::Transformed(Value::String(tag(&ciphertext))),
            Err(error) => {
                self.observer.on_encrypt_failure(field, &error);
                Outcome::Fallback { value, error }
            }
        }
    }

    /// Read path, returning the [`Outcome`].
    ///
    /// Untagged values are legacy plaintext and pass through.
    pub fn decrypt_field(&self, field: &str, stored: Value, config: &FieldConfig) -> Outcome {
        if !is_encryptable(field, config) || !is_tagged(&stored) {
            return Outcome::Unchanged(stored);
        }

        let decrypted = self.cipher.decrypt(untag(stored.as_str().unwrap_or_default()));

        match decrypted {
            Ok(plaintext) => Outcome::Transformed(Value::String(plaintext)),
            Err(error) => {
                self.observer.on_decrypt_failure(field, &error);
                Outcome::Fallback { value: stored, error }
            }
        }
    }

    /// Transforms a value assigned to `field` into its stored form.
    pub fn on_field_set(&self, field: &str, value: Value, config: &FieldConfig) -> Value {
        self.encrypt_field(field, value, config).into_value()
    }

    /// Transforms a stored value of `field` into the value exposed to callers.
    pub fn on_field_get(&self, field: &str, stored: Value, config: &FieldConfig) -> Value {
        self.decrypt_field(field, stored, config).into_value()
    }

    /// Applies [`FieldCrypt::on_field_get`] to every entry, keeping keys and order.
    pub fn on_fields_export(&self, stored: &Record, config: &FieldConfig) -> Record {
        stored
            .iter()
            .map(|(field, value)| (field.clone(), self.on_field_get(field, value.clone(), config)))
            .collect()
    }

    /// Applies [`FieldCrypt::on_field_set`] to every entry, keeping keys and order.
    pub fn on_fields_store(&self, fields: &Record, config: &FieldConfig) -> Record {
        fields
            .iter()
            .map(|(field, value)| (field.clone(), self.on_field_set(field, value.clone(), config)))
            .collect()
    }
}

impl<C: FieldCipher> Clone for FieldCrypt<C> {
    fn clone(&self) -> Self {
        Self { cipher: Arc::clone(&self.cipher), observer: Arc::clone(&self.observer) }
    }
}
