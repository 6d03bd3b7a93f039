//! # Subscriptions
//!
//! [`PlasmaClient`] is the entry point most applications want: give it the event types
//! to listen to and a callback, and it keeps a streaming call open for you.
//!
//! The outbound direction of the call stays open after the first request, so the
//! returned [`Subscription`] can replace the subscribed event types at any time with
//! [`Subscription::update`]. Finishing or dropping the subscription half-closes the call;
//! the server decides when the inbound direction ends.
use super::{
    EventsRpc,
    call::{Call, CallState},
    event::Event,
    stream_service::{InvokeError, StreamServiceClient},
};
use crate::config::{ClientConfig, ConnectError};
use futures_util::{StreamExt, stream::once};
use plasma_proto::Request;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Channel;

/// Outbound requests queued ahead of the transport before `update` waits.
const UPDATE_BUFFER: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("A subscription needs at least one event type")]
    NoEventTypes,
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("A subscription needs at least one event type")]
    NoEventTypes,
    #[error("The subscription is finished or its call has terminated")]
    Closed,
}

/// Subscribes to Plasma events.
#[derive(Debug, Clone)]
pub struct PlasmaClient<R = StreamServiceClient<Channel>> {
    rpc: R,
}

impl PlasmaClient<StreamServiceClient<Channel>> {
    /// Creates a client for the configured server. The connection is opened lazily
    /// and shared by every subscription made through this client.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(config: &ClientConfig) -> Result<Self, ConnectError> {
        Ok(Self::from_rpc(StreamServiceClient::from_config(config)?))
    }
}

impl<R: EventsRpc> PlasmaClient<R> {
    pub fn from_rpc(rpc: R) -> Self {
        Self { rpc }
    }

    /// Subscribes to `event_types`.
    ///
    /// `on_event` receives every payload published under one of the subscribed types,
    /// then a terminal event once the server ends the stream, the call fails, or it
    /// is cancelled.
    pub fn subscribe<I, T, F>(
        &self,
        event_types: I,
        on_event: F,
    ) -> Result<Subscription, SubscribeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
        F: FnMut(Event) + Send + 'static,
    {
        let request = Request::for_event_types(event_types);
        if request.events.is_empty() {
            return Err(SubscribeError::NoEventTypes);
        }

        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let requests = once(async { request }).chain(ReceiverStream::new(rx));

        let call = self.rpc.invoke_streaming(requests, on_event)?;

        Ok(Subscription {
            call,
            requests: Some(tx),
        })
    }
}

/// An open subscription.
#[derive(Debug)]
pub struct Subscription {
    call: Call,
    requests: Option<mpsc::Sender<Request>>,
}

impl Subscription {
    pub fn call(&self) -> &Call {
        &self.call
    }

    /// Replaces the subscribed event types.
    pub async fn update<I, T>(&self, event_types: I) -> Result<(), UpdateError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let request = Request::for_event_types(event_types);
        if request.events.is_empty() {
            return Err(UpdateError::NoEventTypes);
        }

        let requests = self.requests.as_ref().ok_or(UpdateError::Closed)?;
        requests
            .send(request)
            .await
            .map_err(|_| UpdateError::Closed)
    }

    /// Half-closes the call: no more updates will be sent.
    pub fn finish(&mut self) {
        self.requests = None;
    }

    pub fn cancel(&self) {
        self.call.cancel();
    }

    /// Waits until the terminal event has been delivered.
    pub async fn closed(&self) -> CallState {
        self.call.closed().await
    }
}
