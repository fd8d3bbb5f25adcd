use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default deadline for every guarded call, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Default deadline for every guarded call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

/// A per-attempt cancellation token bound to a point in time.
///
/// No task is spawned. The timer exists only while [`expired`](Self::expired)
/// is being polled, which the guarded call does inline next to the transport
/// future; when the deadline passes, the token is cancelled so the transport
/// can abort its exchange. Releasing the handle, explicitly via
/// [`release`](Self::release) or by dropping it, leaves nothing behind that
/// could fire later. A handle is never shared across attempts.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use console_guard::Deadline;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let deadline = Deadline::start(Duration::from_millis(15_000));
/// let token = deadline.token();
/// assert!(!deadline.is_expired());
///
/// deadline.release();
/// // Nothing is left to fire; the token can only be cancelled by hand now.
/// assert!(!token.is_cancelled());
/// # }
/// ```
#[derive(Debug)]
pub struct Deadline {
    token: CancellationToken,
    at: Instant,
    duration: Duration,
}

impl Deadline {
    /// Starts a deadline that fires `duration` from now.
    pub fn start(duration: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            at: Instant::now() + duration,
            duration,
        }
    }

    /// Returns a token cancelled when the deadline fires.
    ///
    /// Transports use it to abort an in-flight request.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Completes once the deadline has fired, cancelling the token.
    ///
    /// Also completes early if the token is cancelled by hand.
    pub async fn expired(&self) {
        tokio::select! {
            () = tokio::time::sleep_until(self.at) => self.token.cancel(),
            () = self.token.cancelled() => {}
        }
    }

    /// Returns `true` if the deadline has already fired.
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the configured duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Releases the deadline. Nothing is left behind that could fire later.
    pub fn release(self) {}
}
