/// A value that passed a [`Sanitizer`](crate::Sanitizer).
///
/// There is no public constructor; only sanitizers inside this crate create
/// `Verified` values, so holding one proves the check ran.
///
/// ```compile_fail
/// use console_guard::Verified;
///
/// let verified = Verified::new_unchecked("RUN".to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Wraps a value the caller has already validated.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the wrapper and returns the value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}
