use plasma_core::plasma_proto::{Payload, Request, StreamService, StreamServiceServer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status, Streaming};

/// How the server behaves for every call it receives.
#[derive(Clone)]
pub enum Script {
    /// Reads requests until the client half-closes, then sends the payloads and completes.
    ReplyAfterHalfClose(Vec<Payload>),
    /// Sends the payloads right away and then keeps the stream open until the client leaves.
    ReplyThenHold(Vec<Payload>),
    /// Reads a single request and fails the call.
    FailAfterFirst(Status),
    /// Answers each request with one payload per event type, completes on half-close.
    Echo,
    /// Never answers.
    Silent,
}

/// What the server saw, shared with the test.
#[derive(Clone, Default)]
pub struct Recorder {
    received: Arc<Mutex<Vec<Request>>>,
    half_closed: Arc<AtomicBool>,
}

impl Recorder {
    pub fn received(&self) -> Vec<Request> {
        self.received.lock().unwrap().clone()
    }

    pub fn half_closed(&self) -> bool {
        self.half_closed.load(Ordering::SeqCst)
    }

    fn record(&self, request: Request) {
        self.received.lock().unwrap().push(request);
    }

    fn mark_half_closed(&self) {
        self.half_closed.store(true, Ordering::SeqCst);
    }

    /// Drains the inbound direction, recording every request.
    async fn drain(&self, inbound: &mut Streaming<Request>) {
        while let Ok(Some(request)) = inbound.message().await {
            self.record(request);
        }
        self.mark_half_closed();
    }
}

pub struct PlasmaServiceImpl {
    script: Script,
    recorder: Recorder,
}

impl PlasmaServiceImpl {
    pub fn server(script: Script) -> (StreamServiceServer<Self>, Recorder) {
        let recorder = Recorder::default();
        let service = Self {
            script,
            recorder: recorder.clone(),
        };
        (StreamServiceServer::new(service), recorder)
    }
}

#[tonic::async_trait]
impl StreamService for PlasmaServiceImpl {
    type EventsStream = ReceiverStream<Result<Payload, Status>>;

    async fn events(
        &self,
        request: tonic::Request<Streaming<Request>>,
    ) -> Result<Response<Self::EventsStream>, Status> {
        let mut inbound = request.into_inner();
        let recorder = self.recorder.clone();
        let (tx, rx) = mpsc::channel(16);

        match self.script.clone() {
            Script::FailAfterFirst(status) => {
                if let Some(request) = inbound.message().await? {
                    recorder.record(request);
                }
                return Err(status);
            }
            Script::ReplyAfterHalfClose(payloads) => {
                tokio::spawn(async move {
                    recorder.drain(&mut inbound).await;
                    for payload in payloads {
                        if tx.send(Ok(payload)).await.is_err() {
                            return;
                        }
                    }
                });
            }
            Script::ReplyThenHold(payloads) => {
                tokio::spawn(async move {
                    for payload in payloads {
                        if tx.send(Ok(payload)).await.is_err() {
                            return;
                        }
                    }
                    recorder.drain(&mut inbound).await;
                    tx.closed().await;
                });
            }
            Script::Echo => {
                tokio::spawn(async move {
                    while let Ok(Some(request)) = inbound.message().await {
                        let replies: Vec<_> = request
                            .events
                            .iter()
                            .map(|e| Payload::new(e.r#type.clone(), format!("echo: {}", e.r#type)))
                            .collect();
                        recorder.record(request);

                        for payload in replies {
                            if tx.send(Ok(payload)).await.is_err() {
                                return;
                            }
                        }
                    }
                    recorder.mark_half_closed();
                });
            }
            Script::Silent => {
                tokio::spawn(async move {
                    recorder.drain(&mut inbound).await;
                    tx.closed().await;
                });
            }
        }

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// Bounds every await in the tests so a broken invariant fails instead of hanging.
pub async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}
