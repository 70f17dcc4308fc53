//! Tagging codec marking values written by the encrypt path.
//!
//! Stored format:
//! ```text
//! __ELOCRYPT__:<ciphertext>
//! ```
//!
//! No escaping is performed. A plaintext value that happens to begin with
//! [`TAG`] is indistinguishable from ciphertext.

use serde_json::Value;

/// Prefix of every encrypted value. Changing it orphans existing data.
pub const TAG: &str = "__ELOCRYPT__:";

/// Returns `true` if `value` is a string starting with [`TAG`].
///
/// Values that are not strings (numbers, objects, null...) are never tagged.
#[must_use]
pub fn is_tagged(value: &Value) -> bool {
    value.as_str().is_some_and(is_tagged_str)
}

/// Returns `true` if `value` starts with [`TAG`].
#[must_use]
pub fn is_tagged_str(value: &str) -> bool {
    value.starts_with(TAG)
}

/// Prepends [`TAG`] to `ciphertext`.
#[must_use]
pub fn tag(ciphertext: &str) -> String {
    let mut tagged = String::with_capacity(TAG.len() + ciphertext.len());
    tagged.push_str(TAG);
    tagged.push_str(ciphertext);
    tagged
}

/// Strips the [`TAG`] prefix.
///
/// The caller must have checked [`is_tagged_str`] first; an untagged input
/// yields an empty string.
#[must_use]
pub fn untag(tagged: &str) -> &str {
    debug_assert!(is_tagged_str(tagged));
    tagged.strip_prefix(TAG).unwrap_or_default()
}
