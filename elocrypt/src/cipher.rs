//! Cipher primitive used by the read and write paths.
//!
//! [`FieldCipher`] is the seam between the interception layer and the actual
//! cryptography. [`AeadCipher`] is the bundled implementation.

use crate::error::Error;
use crate::key::EncryptionKey;
use crate::payload::Payload;
use aes_gcm::Aes256Gcm;
use chacha20poly1305::{
    aead::{generic_array::GenericArray, rand_core::RngCore, Aead, KeyInit, OsRng},
    ChaCha20Poly1305,
};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Nonce size for both supported AEAD modes (96 bits).
const NONCE_SIZE: usize = 12;

/// Encrypts and decrypts string field values.
///
/// Implementations must be thread-safe (`Send + Sync`); the read and write
/// paths may call them concurrently from any number of threads.
///
/// # Example
///
/// ```rust,ignore
/// use elocrypt::cipher::FieldCipher;
/// use elocrypt::error::Error;
///
/// struct MyCipher;
///
/// impl FieldCipher for MyCipher {
///     fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
///         // Implementation
///     }
///     fn decrypt(&self, ciphertext: &str) -> Result<String, Error> {
///         // Implementation
///     }
/// }
/// ```
pub trait FieldCipher: Send + Sync {
    /// Encrypts `plaintext` into a string-safe ciphertext.
    ///
    /// # Errors
    ///
    /// Returns error if the cipher rejects the input.
    fn encrypt(&self, plaintext: &str) -> Result<String, Error>;

    /// Decrypts a ciphertext produced by [`FieldCipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns error on malformed input, wrong key or algorithm mismatch.
    fn decrypt(&self, ciphertext: &str) -> Result<String, Error>;
}

impl<C: FieldCipher + ?Sized> FieldCipher for Arc<C> {
    fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, Error> {
        (**self).decrypt(ciphertext)
    }
}

/// Cipher mode for encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CipherMode {
    /// ChaCha20-Poly1305 AEAD cipher (default).
    #[default]
    #[serde(rename = "chacha20-poly1305", alias = "chacha20poly1305")]
    ChaCha20Poly1305,

    /// AES-256-GCM AEAD cipher.
    #[serde(rename = "aes-256-gcm", alias = "aes256gcm")]
    Aes256Gcm,
}

impl CipherMode {
    /// Returns the identifier stored in payloads.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::ChaCha20Poly1305 => 1,
            Self::Aes256Gcm => 2,
        }
    }

    /// Parses a payload identifier.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::ChaCha20Poly1305),
            2 => Some(Self::Aes256Gcm),
            _ => None,
        }
    }

    /// Returns the configuration name of the mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChaCha20Poly1305 => "chacha20-poly1305",
            Self::Aes256Gcm => "aes-256-gcm",
        }
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// AEAD field cipher with a single key and a fresh nonce per call.
///
/// Ciphertext is the base64 encoding of a [`Payload`].
///
/// # Example
///
/// ```
/// use elocrypt::cipher::{AeadCipher, CipherMode, FieldCipher};
/// use elocrypt::key::EncryptionKey;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cipher = AeadCipher::new(EncryptionKey::generate(), CipherMode::default());
///
/// let ciphertext = cipher.encrypt("alice@example.com")?;
/// assert_eq!(cipher.decrypt(&ciphertext)?, "alice@example.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AeadCipher {
    key: EncryptionKey,
    mode: CipherMode,
}

impl AeadCipher {
    /// Creates a cipher for `key` in `mode`.
    #[must_use]
    pub const fn new(key: EncryptionKey, mode: CipherMode) -> Self {
        Self { key, mode }
    }

    /// Returns the configured cipher mode.
    #[must_use]
    pub const fn mode(&self) -> CipherMode {
        self.mode
    }

    fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let nonce = GenericArray::from_slice(nonce);
        match self.mode {
            CipherMode::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(self.key.expose())
                .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {e}")))?
                .encrypt(nonce, plaintext)
                .map_err(|e| {
                    Error::EncryptionFailed(format!("ChaCha20-Poly1305 encryption failed: {e}"))
                }),
            CipherMode::Aes256Gcm => Aes256Gcm::new_from_slice(self.key.expose())
                .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {e}")))?
                .encrypt(nonce, plaintext)
                .map_err(|e| {
                    Error::EncryptionFailed(format!("AES-256-GCM encryption failed: {e}"))
                }),
        }
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        if nonce.len() != NONCE_SIZE {
            return Err(Error::DecryptionFailed("Invalid nonce size".to_string()));
        }
        let nonce = GenericArray::from_slice(nonce);
        match self.mode {
            CipherMode::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(self.key.expose())
                .map_err(|e| Error::DecryptionFailed(format!("Invalid key: {e}")))?
                .decrypt(nonce, ciphertext)
                .map_err(|_| Error::AuthenticationFailed),
            CipherMode::Aes256Gcm => Aes256Gcm::new_from_slice(self.key.expose())
                .map_err(|e| Error::DecryptionFailed(format!("Invalid key: {e}")))?
                .decrypt(nonce, ciphertext)
                .map_err(|_| Error::AuthenticationFailed),
        }
    }
}

impl FieldCipher for AeadCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self.seal(&nonce, plaintext.as_bytes())?;

        Payload::new(self.mode, nonce.to_vec(), ciphertext).to_base64()
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, Error> {
        let payload = Payload::from_base64(ciphertext)?;

        if payload.mode() != self.mode {
            return Err(Error::AlgorithmMismatch {
                expected: self.mode.to_string(),
                found: payload.mode().to_string(),
            });
        }

        let plaintext = self.open(payload.nonce(), payload.ciphertext())?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::DecryptionFailed(format!("Invalid UTF-8 plaintext: {e}")))
    }
}
