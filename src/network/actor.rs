//! Network actor - runs API calls in the Tokio runtime

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::error::ApiError;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::ApiClient;

/// Network actor that executes [`NetworkCommand`]s concurrently
pub struct NetworkActor {
    client: ApiClient,
    timeout: Duration,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    cancel_handles: HashMap<u64, oneshot::Sender<()>>,
}

impl NetworkActor {
    pub fn new(
        client: ApiClient,
        timeout: Duration,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            client,
            timeout,
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { id, call, token }) => {
                            let (cancel_tx, cancel_rx) = oneshot::channel();
                            self.cancel_handles.insert(id, cancel_tx);

                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();
                            let timeout = self.timeout;

                            self.active_requests.spawn(async move {
                                let name = call.name();
                                tracing::info!(id, call = name, "Executing call");
                                let start = Instant::now();

                                let outcome = tokio::select! {
                                    result = tokio::time::timeout(timeout, client.execute(call, token.as_deref())) => {
                                        Some(result.unwrap_or(Err(ApiError::Timeout)))
                                    }
                                    _ = cancel_rx => None,
                                };

                                // Cancelled calls are reported by the actor itself
                                if let Some(result) = outcome {
                                    let time_ms = start.elapsed().as_millis() as u64;
                                    match &result {
                                        Ok(_) => tracing::info!(id, call = name, time_ms, "Call completed"),
                                        Err(e) => tracing::warn!(id, call = name, time_ms, error = %e, "Call failed"),
                                    }
                                    let _ = response_tx.send(NetworkResponse::Completed { id, result, time_ms });
                                }
                                id
                            });
                        }

                        Some(NetworkCommand::CancelRequest(id)) => {
                            if let Some(cancel_tx) = self.cancel_handles.remove(&id) {
                                tracing::info!(id, "Cancelling call");
                                let _ = cancel_tx.send(());
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::Shutdown) => {
                            for (_, cancel_tx) in self.cancel_handles.drain() {
                                let _ = cancel_tx.send(());
                            }
                            break;
                        }

                        None => break,
                    }
                }

                Some(joined) = self.active_requests.join_next() => {
                    if let Ok(id) = joined {
                        self.cancel_handles.remove(&id);
                    }
                }
            }
        }

        self.active_requests.shutdown().await;
    }
}
