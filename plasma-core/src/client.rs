//! # Plasma Client
//!
//! This module implements the calling side of `plasma.StreamService/Events`.
//!
//! The procedure is a single bidirectional stream, but callers reach it in two shapes,
//! both described by the [`EventsRpc`] trait:
//!
//! 1. **[`EventsRpc::invoke_unary`]**: send one [`Request`], then half-close.
//! 2. **[`EventsRpc::invoke_streaming`]**: forward every request produced by a `Stream`,
//!    half-closing when the stream ends.
//!
//! In both cases the call is driven in the background and the caller gets a [`Call`]
//! handle back immediately. Responses are delivered to the `on_event` callback as
//! [`Event::Response`], followed by exactly one terminal event ([`Event::Completed`] or
//! [`Event::Failed`]). Nothing is delivered after the terminal event.
//!
//! ## Example
//!
//! ```rust,no_run
//! use plasma_core::client::{EventsRpc, StreamServiceClient};
//! use plasma_core::Request;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = StreamServiceClient::with_host("http://localhost:50051")?;
//!
//! let call = client.invoke_unary(Request::for_event_types(["event:111"]), |event| {
//!     println!("{event:?}");
//! })?;
//!
//! call.closed().await;
//! # Ok(())
//! # }
//! ```
mod call;
mod event;
mod stream_service;
mod subscription;

pub use call::{Call, CallId, CallState};
pub use event::{CallError, Event};
pub use stream_service::{InvokeError, StreamServiceClient};
pub use subscription::{PlasmaClient, SubscribeError, Subscription, UpdateError};

use futures_util::Stream;
use plasma_proto::Request;

/// The two ways of invoking the `Events` procedure.
///
/// Both return as soon as the call has been scheduled; they never wait for the server.
/// A synchronous error means no call was created and `on_event` will never be invoked.
pub trait EventsRpc {
    /// Opens a call that sends exactly one request and then half-closes.
    fn invoke_unary<F>(&self, request: Request, on_event: F) -> Result<Call, InvokeError>
    where
        F: FnMut(Event) + Send + 'static;

    /// Opens a call that forwards `requests` in order and half-closes once the stream ends.
    ///
    /// The stream may wait between items; inbound responses keep flowing meanwhile.
    fn invoke_streaming<P, F>(&self, requests: P, on_event: F) -> Result<Call, InvokeError>
    where
        P: Stream<Item = Request> + Send + 'static,
        F: FnMut(Event) + Send + 'static;
}
