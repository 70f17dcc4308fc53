//! # `elocrypt`
//!
//! Transparent, field-selective encryption for structured records.
//!
//! A record type names the fields it considers sensitive. Writes to those
//! fields are encrypted and tagged with a fixed marker; reads detect the
//! marker, decrypt and hand back plaintext. Values without the marker
//! (legacy plaintext) pass through untouched.
//!
//! ## Features
//!
//! - AEAD field encryption (ChaCha20-Poly1305, AES-256-GCM)
//! - Tagged ciphertext that coexists with unmigrated plaintext
//! - Fail-open read and write paths with an observable fallback
//! - Record decorator and `#[derive(Encryptable)]` allow-lists
//!
//! ## Example
//!
//! ```rust,ignore
//! use elocrypt::prelude::*;
//!
//! let cipher = Settings::from_env()?.build_cipher()?;
//! let crypt = FieldCrypt::new(cipher);
//! let config = FieldConfig::new(["secret"]);
//!
//! let stored = crypt.on_field_set("secret", "hello".into(), &config);
//! assert_eq!(crypt.on_field_get("secret", stored, &config), "hello");
//! ```

#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cipher;
pub mod classifier;
pub mod crypt;
pub mod error;
pub mod key;
pub mod observer;
pub mod payload;
pub mod record;
pub mod settings;
pub mod tag;

pub use serde_json::{Map, Value};

/// An ordered field mapping as the host stores it.
pub type Record = Map<String, Value>;

pub mod prelude {
    //! Convenience re-exports for common use.
    pub use crate::cipher::{AeadCipher, CipherMode, FieldCipher};
    pub use crate::classifier::{is_encryptable, Encryptable, FieldConfig};
    pub use crate::crypt::{FieldCrypt, Outcome};
    pub use crate::error::{Error, KeyError};
    pub use crate::key::EncryptionKey;
    pub use crate::observer::{FailureCounter, FailureObserver, TracingObserver};
    pub use crate::record::{EncryptedRecord, FieldStore};
    pub use crate::settings::Settings;
    pub use crate::tag::{is_tagged, TAG};
    pub use crate::Record;
}
