//! Process-wide cipher configuration read from the environment.
//!
//! | variable            | meaning                                            |
//! |---------------------|----------------------------------------------------|
//! | `ELOCRYPT_KEY`      | base64 key, optionally prefixed with `base64:`     |
//! | `ELOCRYPT_KEY_FILE` | file holding the key, used when no key is set      |
//! | `ELOCRYPT_CIPHER`   | `chacha20-poly1305` (default) or `aes-256-gcm`     |

use crate::cipher::{AeadCipher, CipherMode};
use crate::error::{Error, KeyError};
use crate::key::EncryptionKey;
use config::{Config, Environment};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ELOCRYPT";

/// Cipher configuration.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Base64 key material.
    #[serde(default)]
    pub key: Option<SecretString>,

    /// Path to a file holding the base64 key.
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// AEAD mode for new ciphertexts and the only mode accepted on read.
    #[serde(default)]
    pub cipher: CipherMode,
}

impl Settings {
    /// Loads settings from `ELOCRYPT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings from an explicit environment source.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a variable has an invalid value.
    pub fn from_environment(environment: Environment) -> Result<Self, Error> {
        let settings = Config::builder().add_source(environment).build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Overrides the key file, taking precedence over `ELOCRYPT_KEY`.
    #[must_use]
    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key = None;
        self.key_file = Some(path.into());
        self
    }

    /// Resolves the configured key.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Missing` if neither a key nor a key file is set, or
    /// the key loading error otherwise.
    pub fn load_key(&self) -> Result<EncryptionKey, KeyError> {
        if let Some(key) = &self.key {
            return EncryptionKey::from_base64(key.expose_secret());
        }
        match &self.key_file {
            Some(path) => EncryptionKey::from_file(path),
            None => Err(KeyError::Missing),
        }
    }

    /// Builds the configured cipher.
    ///
    /// # Errors
    ///
    /// Returns error if the key cannot be loaded.
    pub fn build_cipher(&self) -> Result<AeadCipher, Error> {
        let key = self.load_key()?;
        tracing::debug!(cipher = %self.cipher, "encryption key loaded");
        Ok(AeadCipher::new(key, self.cipher))
    }
}
