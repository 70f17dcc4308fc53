//! Hooks that make fail-open fallbacks visible.

use crate::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives cipher failures swallowed by the read and write paths.
///
/// Implementations must be cheap and must not panic; they run inline on
/// every failed field operation.
pub trait FailureObserver: Send + Sync {
    /// Called when a write stored plaintext because encryption failed.
    fn on_encrypt_failure(&self, field: &str, error: &Error);

    /// Called when a read returned the still-tagged value because decryption failed.
    fn on_decrypt_failure(&self, field: &str, error: &Error);
}

/// Logs every failure as a `tracing` warning. Used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FailureObserver for TracingObserver {
    fn on_encrypt_failure(&self, field: &str, error: &Error) {
        tracing::warn!(field, %error, "encryption failed, storing plaintext");
    }

    fn on_decrypt_failure(&self, field: &str, error: &Error) {
        tracing::warn!(field, %error, "decryption failed, returning stored value");
    }
}

/// Counts failures and logs them through [`TracingObserver`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use elocrypt::observer::FailureCounter;
///
/// let counter = Arc::new(FailureCounter::new());
/// assert_eq!(counter.decrypt_failures(), 0);
/// ```
#[derive(Debug, Default)]
pub struct FailureCounter {
    encrypt: AtomicU64,
    decrypt: AtomicU64,
}

impl FailureCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { encrypt: AtomicU64::new(0), decrypt: AtomicU64::new(0) }
    }

    /// Number of writes that fell back to plaintext.
    #[must_use]
    pub fn encrypt_failures(&self) -> u64 {
        self.encrypt.load(Ordering::Relaxed)
    }

    /// Number of reads that fell back to the stored value.
    #[must_use]
    pub fn decrypt_failures(&self) -> u64 {
        self.decrypt.load(Ordering::Relaxed)
    }
}

impl FailureObserver for FailureCounter {
    fn on_encrypt_failure(&self, field: &str, error: &Error) {
        self.encrypt.fetch_add(1, Ordering::Relaxed);
        TracingObserver.on_encrypt_failure(field, error);
    }

    fn on_decrypt_failure(&self, field: &str, error: &Error) {
        self.decrypt.fetch_add(1, Ordering::Relaxed);
        TracingObserver.on_decrypt_failure(field, error);
    }
}
