use crate::BoxError;
use plasma_proto::Payload;

/// Why a call ended without completing.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("Transport was not ready to open the call: '{0}'")]
    NotReady(#[source] BoxError),
    #[error("The call failed with status {}: '{}'", .0.code(), .0.message())]
    Status(#[from] tonic::Status),
    #[error("The call was cancelled by the caller")]
    Cancelled,
}

impl CallError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CallError::Cancelled)
    }

    /// The gRPC status reported by the peer or the transport, if any.
    pub fn status(&self) -> Option<&tonic::Status> {
        match self {
            CallError::Status(status) => Some(status),
            _ => None,
        }
    }
}

/// What a call reports to its callback.
///
/// A call produces any number of `Response` events and then exactly one of
/// `Completed` or `Failed`.
#[derive(Debug)]
pub enum Event {
    Response(Payload),
    Completed,
    Failed(CallError),
}

impl Event {
    /// `true` for the terminal event.
    pub fn is_done(&self) -> bool {
        !matches!(self, Event::Response(_))
    }

    pub fn response(&self) -> Option<&Payload> {
        match self {
            Event::Response(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CallError> {
        match self {
            Event::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Splits the event into the `(done, response, error)` triple.
    pub fn into_parts(self) -> (bool, Option<Payload>, Option<CallError>) {
        match self {
            Event::Response(payload) => (false, Some(payload), None),
            Event::Completed => (true, None, None),
            Event::Failed(err) => (true, None, Some(err)),
        }
    }
}

impl From<Result<(), CallError>> for Event {
    fn from(outcome: Result<(), CallError>) -> Self {
        match outcome {
            Ok(()) => Event::Completed,
            Err(err) => Event::Failed(err),
        }
    }
}
