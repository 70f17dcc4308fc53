//! Error types for `elocrypt` operations.

use std::fmt;

/// Main error type for `elocrypt` operations.
///
/// None of these reach the host through the read or write paths; they are
/// carried by [`Outcome::Fallback`](crate::crypt::Outcome::Fallback) and
/// reported to the failure observer instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Encryption operation failed
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption operation failed
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Authentication tag verification failed (wrong key, corrupted or tampered data)
    #[error("authentication failed: wrong key or corrupted ciphertext")]
    AuthenticationFailed,

    /// Ciphertext payload could not be parsed
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Unsupported payload version
    #[error("unsupported version: {version} (supported: {supported})")]
    UnsupportedVersion {
        /// The version found in the payload
        version: u8,
        /// Supported versions
        supported: String,
    },

    /// Payload was produced by a different cipher mode
    #[error("algorithm mismatch: configured {expected}, payload uses {found}")]
    AlgorithmMismatch {
        /// Mode of the configured cipher
        expected: String,
        /// Mode recorded in the payload
        found: String,
    },

    /// Key loading failed
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Errors specific to loading the encryption key.
#[derive(Debug)]
pub enum KeyError {
    /// No key configured
    Missing,

    /// Key is not valid base64
    InvalidEncoding(String),

    /// Decoded key has the wrong size
    InvalidLength {
        /// Required key size in bytes
        expected: usize,
        /// Size of the supplied key
        actual: usize,
    },

    /// Key file could not be read
    Io(std::io::Error),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no encryption key configured"),
            Self::InvalidEncoding(msg) => write!(f, "invalid key encoding: {msg}"),
            Self::InvalidLength { expected, actual } => {
                write!(f, "invalid key length: {actual} bytes (expected: {expected})")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KeyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
