use std::fmt;

/// A wrapper that keeps credentials out of logs and error text.
///
/// `Secret<T>` holds the backend API key. The wrapped value is reachable only
/// through [`expose_secret`](Self::expose_secret), which the transport calls
/// when it writes the auth header.
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Borrow`, `Clone`, or `Copy`
/// - Debug and Display output is always `[REDACTED]`
/// - No type information is leaked in formatted output
///
/// # Examples
///
/// ```
/// use console_guard::Secret;
///
/// let api_key = Secret::new("sk-1234567890".to_string());
///
/// assert_eq!(format!("{:?}", api_key), "[REDACTED]");
/// assert_eq!(format!("{}", api_key), "[REDACTED]");
/// assert_eq!(api_key.expose_secret(), "sk-1234567890");
/// ```
// Do NOT derive Clone, Copy, or Default: duplicating the key must stay explicit.
pub struct Secret<T> {
    // Must remain private; a public field defeats redaction (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// The verbose name marks every place key material leaves the wrapper.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
