//! # Plasma Core
//!
//! `plasma-core` is a streaming client for the Plasma `StreamService.Events` procedure,
//! a bidirectional gRPC stream where the client sends subscription [`Request`]s and the
//! server pushes back [`Payload`]s as events are published.
//!
//! ## Key Components
//!
//! * **[`StreamServiceClient`]:** The service facade. It turns a single request, or a stream
//!   of requests, into one call on the underlying `tonic` transport and reports everything
//!   that comes back through a single callback.
//! * **[`Call`]:** A handle to one in-flight invocation, used to cancel it or to wait for it
//!   to finish.
//! * **[`Event`]:** What the callback receives: zero or more responses followed by exactly
//!   one terminal event (completion or failure).
//! * **[`PlasmaClient`]:** A higher level entry point that subscribes to a list of event types
//!   and keeps the outbound direction open so the subscription can be changed later.
//!
//! ## Transport
//!
//! Connection management, HTTP/2 framing, TLS and flow control are left to `tonic`.
//! The facade is generic over any `tonic::client::GrpcService`, so the same code runs
//! against a `Channel` or against an in-process server.
//!
//! ## Re-exports
//!
//! This crate re-exports `plasma-proto` and `tonic` to ensure that consumers
//! use compatible versions of the message types and the transport.
//!
//! [`Request`]: plasma_proto::Request
//! [`Payload`]: plasma_proto::Payload
//! [`StreamServiceClient`]: client::StreamServiceClient
//! [`Call`]: client::Call
//! [`Event`]: client::Event
//! [`PlasmaClient`]: client::PlasmaClient
pub mod client;
pub mod config;

// Re-exports
pub use plasma_proto;
pub use plasma_proto::{EventType, Payload, Request};
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
