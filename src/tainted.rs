use std::fmt;

/// Caller-supplied input that has not been checked yet.
///
/// Commands handed to [`GuardedClient::execute_command`](crate::GuardedClient::execute_command)
/// are wrapped in `Tainted` on entry. The only way out is a
/// [`Sanitizer`](crate::Sanitizer), which either rejects the value or
/// promotes it to [`Verified`](crate::Verified).
///
/// # Examples
///
/// ```
/// use console_guard::{CommandSanitizer, Sanitizer, Tainted};
///
/// let input = Tainted::new("RUN_DIAGNOSTIC".to_string());
/// let verified = CommandSanitizer::default().sanitize(input).expect("valid command");
/// assert_eq!(verified.as_ref(), "RUN_DIAGNOSTIC");
///
/// let input = Tainted::new("run_diag".to_string());
/// assert!(CommandSanitizer::default().sanitize(input).is_err());
/// ```
#[derive(Clone)]
pub struct Tainted<T> {
    // Private so unchecked values cannot reach the transport (CWE-20).
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an unchecked value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Extracts the inner value. Only sanitizers may call this.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}

impl From<&str> for Tainted<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Tainted<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tainted_debug_marks_value() {
        let input = Tainted::new("DROP_ALL".to_string());
        let debug_output = format!("{:?}", input);

        assert!(debug_output.contains("Tainted"));
        assert!(debug_output.contains("DROP_ALL"));
    }

    #[test]
    fn tainted_conversions_wrap_without_checking() {
        let from_str: Tainted<String> = "anything goes".into();
        let from_string: Tainted<String> = String::from("ALSO").into();

        assert_eq!(from_str.into_inner(), "anything goes");
        assert_eq!(from_string.into_inner(), "ALSO");
    }
}
