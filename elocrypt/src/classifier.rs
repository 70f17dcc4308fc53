//! Field classification: which fields of a record type are encrypted.

use std::collections::BTreeSet;
use std::fmt;

/// A record type that carries a static allow-list of encrypted fields.
///
/// Usually implemented with `#[derive(Encryptable)]` from `elocrypt-derive`.
///
/// # Example
///
/// ```
/// use elocrypt::classifier::{Encryptable, FieldConfig};
///
/// struct User;
///
/// impl Encryptable for User {
///     const ENCRYPTED_FIELDS: &'static [&'static str] = &["email", "phone"];
/// }
///
/// let config = FieldConfig::of::<User>();
/// assert!(config.contains("email"));
/// ```
pub trait Encryptable {
    /// Names of the fields stored encrypted.
    const ENCRYPTED_FIELDS: &'static [&'static str];
}

/// The set of sensitive field names attached to a record type.
///
/// Membership is all that matters: order and duplicates are irrelevant.
/// The set is fixed once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldConfig {
    fields: BTreeSet<String>,
}

impl FieldConfig {
    /// Creates a configuration from field names.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { fields: fields.into_iter().map(Into::into).collect() }
    }

    /// Builds the configuration declared by a record type.
    #[must_use]
    pub fn of<T: Encryptable>() -> Self {
        Self::new(T::ENCRYPTED_FIELDS.iter().copied())
    }

    /// Returns `true` if `field` is configured as sensitive.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Returns the number of distinct sensitive fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the configured field names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldConfig {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", names.join(","))
    }
}

/// Decides whether `field` participates in encryption.
///
/// Pure and total: unknown field names classify as `false`.
#[must_use]
pub fn is_encryptable(field: &str, config: &FieldConfig) -> bool {
    config.contains(field)
}
