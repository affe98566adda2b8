//! The dispatcher: bounded ingress/egress queues plus one ephemeral handler
//! task per in-flight request.
mod handler;

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

use crate::arbiter::Arbiter;
use crate::error::GatewayError;
use crate::shutdown::ShutdownReceiver;
use crate::types::{ClientRequest, ClientResponse};

/// Handles returned by [`spawn`]: the channels the caller feeds/drains, and
/// the dispatcher's own join handle.
pub struct Gateway {
    pub ingress: mpsc::Sender<ClientRequest>,
    pub egress: mpsc::Receiver<ClientResponse>,
    pub join_handle: JoinHandle<()>,
}

/// Spawns the dispatcher: the arbiter's control loop, plus a loop that turns
/// each ingress request into its own handler task. Concurrent in-flight
/// requests are bounded to `maxout` by a semaphore the dequeue loop acquires
/// a permit from before spawning each handler: once `maxout` are outstanding,
/// the loop stops dequeuing, the ingress channel (also capacity `maxout`)
/// backs up, and the producer's `send` blocks in turn.
pub fn spawn(
    maxout: usize,
    arbiter: Arc<dyn Arbiter>,
    client: reqwest::Client,
    compute_url: String,
    storage_url: String,
    shutdown: ShutdownReceiver,
) -> Gateway {
    let (ingress_tx, ingress_rx) = mpsc::channel(maxout);
    let (egress_tx, egress_rx) = mpsc::channel(maxout);
    let outstanding = Arc::new(Semaphore::new(maxout));

    let join_handle = tokio::spawn(run(
        ingress_rx,
        egress_tx,
        arbiter,
        client,
        compute_url,
        storage_url,
        shutdown,
        outstanding,
    ));

    Gateway {
        ingress: ingress_tx,
        egress: egress_rx,
        join_handle,
    }
}

async fn run(
    mut ingress_rx: mpsc::Receiver<ClientRequest>,
    egress_tx: mpsc::Sender<ClientResponse>,
    arbiter: Arc<dyn Arbiter>,
    client: reqwest::Client,
    compute_url: String,
    storage_url: String,
    mut shutdown: ShutdownReceiver,
    outstanding: Arc<Semaphore>,
) {
    let control_arbiter = Arc::clone(&arbiter);
    let control_shutdown = shutdown.resubscribe();
    let control_handle = tokio::spawn(async move {
        control_arbiter.run(control_shutdown).await;
    });

    loop {
        let permit = tokio::select! {
            permit = Arc::clone(&outstanding).acquire_owned() => permit,
            _ = shutdown.recv() => break,
        };
        let Ok(permit) = permit else {
            break;
        };

        tokio::select! {
            received = ingress_rx.recv() => {
                match received {
                    Some(request) => {
                        let arbiter = Arc::clone(&arbiter);
                        let client = client.clone();
                        let egress_tx = egress_tx.clone();
                        let compute_url = compute_url.clone();
                        let storage_url = storage_url.clone();
                        tokio::spawn(async move {
                            let _permit = permit;
                            let response = handler::handle_request(
                                &client,
                                arbiter.as_ref(),
                                &compute_url,
                                &storage_url,
                                request,
                            )
                            .await;
                            if egress_tx.send(response).await.is_err() {
                                tracing::warn!("egress receiver dropped; response discarded");
                            }
                        });
                    }
                    None => {
                        tracing::debug!(error = %GatewayError::IngressClosed, "ingress producer dropped");
                        break;
                    }
                }
            }
            _ = shutdown.recv() => break,
        }
    }

    if let Err(err) = control_handle.await {
        tracing::warn!(error = %err, "arbiter control task exited abnormally");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::Pyxis;
    use crate::config::PyxisConfig;
    use crate::shutdown::shutdown_channel;
    use crate::taskmix::TaskProfile;
    use crate::types::{Payload, Status};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn config() -> PyxisConfig {
        PyxisConfig {
            start_point: 1.0,
            interval_secs: 1.0,
            step_size_rel: 0.1,
            stop_precision: 0.02,
            reference_point: -1.0,
            task_profiles: vec![TaskProfile {
                type_id: 0,
                percentage: 1.0,
                num_kv: 4,
                compute_secs: 0.1,
            }],
        }
    }

    async fn spawn_stub() -> Result<String, String> {
        let app = Router::new().route(
            "/",
            post(|| async {
                Json(ClientResponse {
                    id: String::new(),
                    status: Status::Success,
                    result: None,
                    storage_time_secs: 0.1,
                    compute_time_secs: 0.1,
                    latency: Duration::ZERO,
                })
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| err.to_string())?;
        let addr = listener.local_addr().map_err(|err| err.to_string())?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}/"))
    }

    #[tokio::test]
    async fn each_ingress_request_yields_exactly_one_egress_response() -> Result<(), String> {
        let url = spawn_stub().await?;
        let arbiter: Arc<dyn Arbiter> =
            Arc::new(Pyxis::new(&config()).map_err(|err| err.to_string())?);
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let mut gateway = spawn(
            4,
            arbiter,
            reqwest::Client::new(),
            url.clone(),
            url,
            shutdown_rx,
        );

        for i in 0..5 {
            gateway
                .ingress
                .send(ClientRequest {
                    id: format!("r{i}"),
                    type_id: 0,
                    payload: Payload::DefaultFunc {
                        storage_keys: vec!["k".to_owned()],
                        compute_secs: 0.1,
                    },
                })
                .await
                .map_err(|err| err.to_string())?;
        }

        let mut seen = Vec::new();
        for _ in 0..5 {
            let response = tokio::time::timeout(Duration::from_secs(2), gateway.egress.recv())
                .await
                .map_err(|err| err.to_string())?
                .ok_or_else(|| "egress channel closed early".to_owned())?;
            assert_eq!(response.status, Status::Success);
            seen.push(response.id);
        }
        seen.sort();
        assert_eq!(
            seen,
            vec!["r0".to_owned(), "r1".to_owned(), "r2".to_owned(), "r3".to_owned(), "r4".to_owned()]
        );

        drop(gateway.ingress);
        shutdown_tx.send(()).map_err(|err| err.to_string())?;
        tokio::time::timeout(Duration::from_secs(1), gateway.join_handle)
            .await
            .map_err(|err| err.to_string())?
            .map_err(|err| err.to_string())
    }
}
