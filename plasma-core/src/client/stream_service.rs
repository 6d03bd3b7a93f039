//! # Stream Service Client
//!
//! The facade over the transport. It owns a `tonic::client::Grpc` and, for every
//! invocation, clones it and spawns a driver task on the current tokio runtime.
//!
//! ## Driver
//!
//! The driver is the only place that talks to the callback, which is what makes the
//! delivery guarantees hold:
//!
//! * Responses are delivered in the order the transport decodes them.
//! * The terminal event is delivered after the transport call has been dropped, so no
//!   response can follow it.
//! * Cancellation and completion race inside a single `select!`; whichever resolves first
//!   decides the one terminal event.
//!
//! The outbound stream is wrapped with `take_until(cancelled)`, so once a call is cancelled
//! no further request is pulled from the producer.
use super::{
    EventsRpc,
    call::{Call, CallId, CallState, CallStateWriter},
    event::{CallError, Event},
};
use crate::{
    BoxError,
    config::{ClientConfig, ConnectError},
};
use futures_util::{Stream, StreamExt, stream::once};
use http_body::Body as HttpBody;
use plasma_proto::{EVENTS_PATH, Payload, Request};
use tokio_util::sync::CancellationToken;
use tonic::{
    client::{Grpc, GrpcService},
    transport::{Channel, Endpoint},
};
use tonic_prost::ProstCodec;
use tracing::Instrument;

/// Errors that prevent a call from being created.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("No tokio runtime is available to drive the call: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Client of `plasma.StreamService`, generic over the transport.
#[derive(Debug, Clone)]
pub struct StreamServiceClient<S = Channel> {
    grpc: Grpc<S>,
}

impl StreamServiceClient<Channel> {
    /// Creates a client for `host` (e.g. `http://localhost:50051`) without connecting.
    ///
    /// The connection is established by the first call and shared by every call made
    /// through this client (and its clones). An unreachable host is reported to that
    /// call's callback, not here.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_host(host: &str) -> Result<Self, ConnectError> {
        Self::lazy(endpoint_for_host(host)?)
    }

    /// Creates a client for `host` and waits until the connection is established.
    pub async fn connect(host: &str) -> Result<Self, ConnectError> {
        let endpoint = endpoint_for_host(host)?;

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ConnectError::ConnectionFailed(host.to_string(), e))?;

        Ok(Self::new(channel))
    }

    /// Creates a lazily connected client from a [`ClientConfig`], with TLS when the
    /// config carries a root certificate.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConnectError> {
        Self::lazy(config.endpoint()?)
    }

    fn lazy(endpoint: Endpoint) -> Result<Self, ConnectError> {
        // `connect_lazy` spawns the channel worker and would panic outside a runtime.
        tokio::runtime::Handle::try_current()?;
        Ok(Self::new(endpoint.connect_lazy()))
    }
}

impl<S> StreamServiceClient<S>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Creates a client from an existing Tonic service/channel.
    pub fn new(service: S) -> Self {
        Self {
            grpc: Grpc::new(service),
        }
    }
}

impl<S> StreamServiceClient<S>
where
    S: GrpcService<tonic::body::Body> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    fn spawn_call<P, F>(&self, requests: P, on_event: F) -> Result<Call, InvokeError>
    where
        P: Stream<Item = Request> + Send + 'static,
        F: FnMut(Event) + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()?;

        let id = CallId::next();
        let cancel = CancellationToken::new();
        let (state, state_rx) = CallStateWriter::new();

        let driver = Driver {
            grpc: self.grpc.clone(),
            cancel: cancel.clone(),
            state,
            on_event,
        };
        let span = tracing::debug_span!("events_call", call_id = %id);
        runtime.spawn(driver.run(requests).instrument(span));

        Ok(Call::new(id, state_rx, cancel))
    }
}

impl<S> EventsRpc for StreamServiceClient<S>
where
    S: GrpcService<tonic::body::Body> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    fn invoke_unary<F>(&self, request: Request, on_event: F) -> Result<Call, InvokeError>
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.spawn_call(once(async { request }), on_event)
    }

    fn invoke_streaming<P, F>(&self, requests: P, on_event: F) -> Result<Call, InvokeError>
    where
        P: Stream<Item = Request> + Send + 'static,
        F: FnMut(Event) + Send + 'static,
    {
        self.spawn_call(requests, on_event)
    }
}

struct Driver<S, F> {
    grpc: Grpc<S>,
    cancel: CancellationToken,
    state: CallStateWriter,
    on_event: F,
}

impl<S, F> Driver<S, F>
where
    S: GrpcService<tonic::body::Body> + Send,
    S::Future: Send,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
    F: FnMut(Event) + Send,
{
    async fn run<P>(mut self, requests: P)
    where
        P: Stream<Item = Request> + Send + 'static,
    {
        tracing::debug!("opening events call");

        let requests = requests.take_until(self.cancel.clone().cancelled_owned());

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CallError::Cancelled),
            outcome = exchange(&mut self.grpc, requests, &mut self.on_event) => outcome,
        };

        let terminal = match &outcome {
            Ok(()) => {
                tracing::debug!("events call completed");
                CallState::Completed
            }
            Err(CallError::Cancelled) => {
                tracing::info!("events call cancelled");
                CallState::Cancelled
            }
            Err(err) => {
                tracing::warn!(error = %err, "events call failed");
                CallState::Failed
            }
        };

        (self.on_event)(Event::from(outcome));
        self.state.finish(terminal);
    }
}

async fn exchange<S, P, F>(
    grpc: &mut Grpc<S>,
    requests: P,
    on_event: &mut F,
) -> Result<(), CallError>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
    P: Stream<Item = Request> + Send + 'static,
    F: FnMut(Event),
{
    grpc.ready()
        .await
        .map_err(|e| CallError::NotReady(e.into()))?;

    let path = http::uri::PathAndQuery::from_static(EVENTS_PATH);
    let codec = ProstCodec::<Request, Payload>::default();

    let mut inbound = grpc
        .streaming(tonic::Request::new(requests), path, codec)
        .await?
        .into_inner();

    while let Some(payload) = inbound.message().await? {
        tracing::debug!(event_type = payload.event_type(), "received payload");
        on_event(Event::Response(payload));
    }

    Ok(())
}

fn endpoint_for_host(host: &str) -> Result<Endpoint, ConnectError> {
    if host.trim().is_empty() {
        return Err(ConnectError::EmptyHost);
    }

    Endpoint::from_shared(host.to_string())
        .map_err(|e| ConnectError::InvalidUrl(host.to_string(), e))
}
