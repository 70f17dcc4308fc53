//! Ciphertext payload format.
//!
//! The payload carries what decryption needs besides the key:
//! - Format version
//! - Cipher mode
//! - Nonce
//! - Ciphertext with authentication tag
//!
//! It is stored as standard base64 after the tag prefix.

use crate::cipher::CipherMode;
use crate::error::Error;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Format version of the payload.
pub const PAYLOAD_VERSION: u8 = 1;

/// Encrypted field payload.
///
/// Format:
/// ```text
/// [version:1][mode:1][nonce_len:1][nonce:N][ciphertext:*]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    version: u8,
    mode: CipherMode,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl Payload {
    /// Creates a new payload at the current version.
    #[must_use]
    pub const fn new(mode: CipherMode, nonce: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self { version: PAYLOAD_VERSION, mode, nonce, ciphertext }
    }

    /// Returns the format version.
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Returns the cipher mode that produced the ciphertext.
    #[must_use]
    pub const fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Returns the nonce.
    #[must_use]
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Returns the ciphertext including the authentication tag.
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serializes the payload to bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the nonce is longer than 255 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let nonce_len = u8::try_from(self.nonce.len()).map_err(|_| {
            Error::InvalidPayload(format!("Nonce too long: {} bytes (max: 255)", self.nonce.len()))
        })?;

        let mut bytes = Vec::with_capacity(3 + self.nonce.len() + self.ciphertext.len());
        bytes.push(self.version);
        bytes.push(self.mode.as_u8());
        bytes.push(nonce_len);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);

        Ok(bytes)
    }

    /// Deserializes a payload from bytes.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The data is too short
    /// - The version is not supported
    /// - The cipher mode is unknown
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let (&version, rest) =
            data.split_first().ok_or_else(|| Error::InvalidPayload("Empty payload".to_string()))?;

        if version != PAYLOAD_VERSION {
            return Err(Error::UnsupportedVersion {
                version,
                supported: PAYLOAD_VERSION.to_string(),
            });
        }

        let (&mode, rest) =
            rest.split_first().ok_or_else(|| Error::InvalidPayload("Missing mode".to_string()))?;
        let mode = CipherMode::from_u8(mode)
            .ok_or_else(|| Error::InvalidPayload(format!("Unknown cipher mode: {mode}")))?;

        let (&nonce_len, rest) = rest
            .split_first()
            .ok_or_else(|| Error::InvalidPayload("Missing nonce length".to_string()))?;
        let nonce_len = usize::from(nonce_len);

        if rest.len() < nonce_len {
            return Err(Error::InvalidPayload("Nonce truncated".to_string()));
        }
        let (nonce, ciphertext) = rest.split_at(nonce_len);

        Ok(Self { version, mode, nonce: nonce.to_vec(), ciphertext: ciphertext.to_vec() })
    }

    /// Encodes the payload as standard base64.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_base64(&self) -> Result<String, Error> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Decodes a payload from standard base64.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not base64 or the payload is malformed.
    pub fn from_base64(encoded: &str) -> Result<Self, Error> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::InvalidPayload(format!("Invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_serialization() {
        let payload = Payload::new(CipherMode::ChaCha20Poly1305, vec![7; 12], vec![1, 2, 3, 4]);

        let bytes = payload.to_bytes().expect("Failed to serialize payload");
        assert_eq!(&bytes[..3], &[PAYLOAD_VERSION, CipherMode::ChaCha20Poly1305.as_u8(), 12]);

        let parsed = Payload::from_bytes(&bytes).expect("Failed to parse payload");
        assert_eq!(parsed, payload);
        assert_eq!(parsed.version(), PAYLOAD_VERSION);
        assert_eq!(parsed.nonce(), &[7; 12]);
        assert_eq!(parsed.ciphertext(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_payload_base64() {
        let payload = Payload::new(CipherMode::Aes256Gcm, vec![1; 12], vec![9; 20]);
        let encoded = payload.to_base64().unwrap();
        let parsed = Payload::from_base64(&encoded).unwrap();

        assert_eq!(parsed.mode(), CipherMode::Aes256Gcm);
        assert_eq!(parsed, payload);
    }

    #[test]
    fn test_payload_unsupported_version() {
        let mut bytes = vec![99, CipherMode::ChaCha20Poly1305.as_u8(), 12];
        bytes.extend_from_slice(&[0; 12]);

        let result = Payload::from_bytes(&bytes);
        assert!(matches!(result, Err(Error::UnsupportedVersion { version: 99, .. })));
    }

    #[test]
    fn test_payload_unknown_mode() {
        let result = Payload::from_bytes(&[PAYLOAD_VERSION, 0xEE, 0]);
        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_payload_truncated_data() {
        let result = Payload::from_bytes(&[PAYLOAD_VERSION, 1, 12, 0, 0]);
        assert!(matches!(result, Err(Error::InvalidPayload(_))));

        let result = Payload::from_bytes(&[PAYLOAD_VERSION]);
        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_payload_empty_data() {
        let result = Payload::from_bytes(&[]);
        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_payload_invalid_base64() {
        let result = Payload::from_base64("not base64!");
        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_payload_nonce_too_long() {
        let payload = Payload::new(CipherMode::ChaCha20Poly1305, vec![0; 256], vec![]);
        assert!(matches!(payload.to_bytes(), Err(Error::InvalidPayload(_))));
    }
}
