use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a call, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(u64);

impl CallId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a call. Every state other than `Open` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Open,
    Completed,
    Failed,
    Cancelled,
}

impl CallState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallState::Open)
    }
}

/// Handle to one in-flight call.
///
/// Dropping the handle does not cancel the call; it keeps running until the server
/// completes it or it fails.
#[derive(Debug, Clone)]
pub struct Call {
    id: CallId,
    state: watch::Receiver<CallState>,
    cancel: CancellationToken,
}

impl Call {
    pub(crate) fn new(
        id: CallId,
        state: watch::Receiver<CallState>,
        cancel: CancellationToken,
    ) -> Self {
        Self { id, state, cancel }
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn state(&self) -> CallState {
        *self.state.borrow()
    }

    pub fn is_terminated(&self) -> bool {
        self.state().is_terminal()
    }

    /// Requests the call to be aborted.
    ///
    /// Idempotent, and a no-op once the call has terminated. If the call is still open,
    /// its callback eventually receives exactly one terminal event: a
    /// [`CallError::Cancelled`](super::CallError::Cancelled) failure, or a completion if
    /// the server finished first.
    pub fn cancel(&self) {
        if !self.is_terminated() {
            self.cancel.cancel();
        }
    }

    /// Waits until the terminal event has been delivered and returns the final state.
    pub async fn closed(&self) -> CallState {
        let mut state = self.state.clone();
        let terminal = state.wait_for(CallState::is_terminal).await.map(|s| *s);
        // The driver is gone without reaching a terminal state (its callback panicked).
        terminal.unwrap_or_else(|_| *state.borrow())
    }
}

/// The driver's side of a [`Call`]: it is the only writer of the state.
pub(crate) struct CallStateWriter(watch::Sender<CallState>);

impl CallStateWriter {
    pub(crate) fn new() -> (Self, watch::Receiver<CallState>) {
        let (tx, rx) = watch::channel(CallState::Open);
        (Self(tx), rx)
    }

    /// Moves an open call to `terminal`. Terminal states are absorbing.
    pub(crate) fn finish(&self, terminal: CallState) -> bool {
        self.0.send_if_modified(|state| {
            if state.is_terminal() || !terminal.is_terminal() {
                return false;
            }
            *state = terminal;
            true
        })
    }
}
