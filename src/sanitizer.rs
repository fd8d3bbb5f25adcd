use std::fmt;

use crate::{Tainted, Verified};

/// Error returned when sanitization fails.
///
/// The rejected input is not echoed back.
///
/// # Examples
///
/// ```
/// use console_guard::{SanitizationError, SanitizationErrorKind};
///
/// let error = SanitizationError::new(SanitizationErrorKind::Empty, "command is empty");
/// assert_eq!(error.kind(), SanitizationErrorKind::Empty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationError {
    kind: SanitizationErrorKind,
    message: String,
}

impl SanitizationError {
    /// Creates a new sanitization error.
    pub fn new(kind: SanitizationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SanitizationErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SanitizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sanitization failed ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for SanitizationError {}

/// Kind of sanitization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizationErrorKind {
    /// Input is empty.
    Empty,
    /// Input exceeds the maximum allowed length.
    TooLong,
    /// Input contains characters outside the allowed set.
    ForbiddenCharacter,
}

impl fmt::Display for SanitizationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty input"),
            Self::TooLong => write!(f, "input too long"),
            Self::ForbiddenCharacter => write!(f, "forbidden character"),
        }
    }
}

/// Promotes [`Tainted`] values to [`Verified`] ones.
///
/// Implementations must only call `Verified::new_unchecked` after every check
/// has passed, and must not leak the rejected input in their errors.
pub trait Sanitizer<T> {
    /// Checks a tainted value, returning a verified value on success.
    ///
    /// # Errors
    ///
    /// Returns `SanitizationError` if the input fails validation.
    fn sanitize(&self, input: Tainted<T>) -> Result<Verified<T>, SanitizationError>;
}

/// Validates console command names.
///
/// A command is accepted when it is non-empty, no longer than `max_len`
/// bytes, and made only of ASCII upper-case letters and underscores
/// (`RUN_DIAGNOSTIC`, `STATUS`). Input is not trimmed: surrounding
/// whitespace is a forbidden character like any other.
///
/// # Examples
///
/// ```
/// use console_guard::{CommandSanitizer, Sanitizer, SanitizationErrorKind, Tainted};
///
/// let sanitizer = CommandSanitizer::default();
///
/// assert!(sanitizer.sanitize(Tainted::new("RUN_DIAGNOSTIC".to_string())).is_ok());
///
/// let err = sanitizer.sanitize(Tainted::new("run_diag".to_string())).unwrap_err();
/// assert_eq!(err.kind(), SanitizationErrorKind::ForbiddenCharacter);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CommandSanitizer {
    max_len: usize,
}

impl CommandSanitizer {
    /// Default upper bound on command length.
    pub const DEFAULT_MAX_LEN: usize = 128;

    /// Creates a sanitizer with the given maximum length.
    ///
    /// # Panics
    ///
    /// Panics if `max_len` is 0.
    pub fn new(max_len: usize) -> Self {
        assert!(max_len > 0, "max_len must be greater than 0");
        Self { max_len }
    }

    fn is_command_char(c: char) -> bool {
        c.is_ascii_uppercase() || c == '_'
    }
}

impl Default for CommandSanitizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LEN)
    }
}

impl Sanitizer<String> for CommandSanitizer {
    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<String>, SanitizationError> {
        let raw = input.into_inner();

        if raw.is_empty() {
            return Err(SanitizationError::new(
                SanitizationErrorKind::Empty,
                "command is empty",
            ));
        }

        if raw.len() > self.max_len {
            return Err(SanitizationError::new(
                SanitizationErrorKind::TooLong,
                format!("command exceeds maximum length of {}", self.max_len),
            ));
        }

        if !raw.chars().all(Self::is_command_char) {
            return Err(SanitizationError::new(
                SanitizationErrorKind::ForbiddenCharacter,
                "command must contain only uppercase letters and underscores",
            ));
        }

        Ok(Verified::new_unchecked(raw))
    }
}
