//! # Plasma Proto
//!
//! Protobuf types and the server-side binding of the Plasma `StreamService`.
//!
//! The service exposes a single bidirectional streaming procedure:
//!
//! ```proto
//! rpc Events(stream Request) returns (stream Payload) {}
//! ```
//!
//! A [`Request`] lists the event types a subscriber is interested in, and every
//! [`Payload`] pushed back by the server carries the [`EventType`] it was published under.
//!
//! The message definitions and the server binding live in `proto/stream.proto` and are
//! regenerated with the `generate-proto` binary (feature `gen-proto`). Implement
//! [`StreamService`] and wrap it in a [`StreamServiceServer`] to serve it, or pass the
//! server directly to a client as an in-process `GrpcService`. The client lives in
//! `plasma-core`.
mod generated {
    include!("generated/plasma.rs");
}

pub use generated::{EventType, Payload, Request};
pub use generated::stream_service_server::{StreamService, StreamServiceServer};

// Re-exports
pub use prost;
pub use tonic;

/// Fully qualified name of the Plasma stream service.
pub const SERVICE_NAME: &str = "plasma.StreamService";

/// HTTP/2 path of the `Events` procedure.
pub const EVENTS_PATH: &str = "/plasma.StreamService/Events";

impl EventType {
    pub fn new(r#type: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
        }
    }
}

impl Request {
    /// Builds a subscription request for the given event types, in order.
    pub fn for_event_types<I, T>(event_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            events: event_types.into_iter().map(EventType::new).collect(),
        }
    }
}

impl Payload {
    pub fn new(r#type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            meta: Some(EventType::new(r#type)),
            data: data.into(),
        }
    }

    /// The event type this payload was published under, if the server set one.
    pub fn event_type(&self) -> Option<&str> {
        self.meta.as_ref().map(|meta| meta.r#type.as_str())
    }
}
