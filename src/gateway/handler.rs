use std::time::{Duration, Instant};

use crate::arbiter::Arbiter;
use crate::types::{ClientRequest, ClientResponse, Destination, Status};

const TIER_DEADLINE: Duration = Duration::from_secs(10);

/// Runs one request through the `ENCODED -> ROUTED -> SENT -> DECODED ->
/// COMPLETED` state machine, always producing exactly one response carrying
/// the request's `id`.
pub async fn handle_request(
    client: &reqwest::Client,
    arbiter: &dyn Arbiter,
    compute_url: &str,
    storage_url: &str,
    request: ClientRequest,
) -> ClientResponse {
    let id = request.id.clone();
    let start = Instant::now();

    let body = match serde_json::to_vec(&request) {
        Ok(body) => body,
        Err(err) => return ClientResponse::failure(id, Status::FailMarshal, err.to_string()),
    };

    let destination = match arbiter.schedule(&request) {
        Some(destination) => destination,
        None => {
            return ClientResponse::failure(id, Status::FailSchedule, "invalid arbiter decision");
        }
    };

    let url = match destination {
        Destination::ToCompute => compute_url,
        Destination::ToStorage => storage_url,
    };

    let http_response = match client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .timeout(TIER_DEADLINE)
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => return ClientResponse::failure(id, Status::FailSend, err.to_string()),
    };

    if !http_response.status().is_success() {
        let status_code = http_response.status();
        let text = http_response
            .text()
            .await
            .unwrap_or_else(|err| format!("failed to read response body: {err}"));
        return ClientResponse::failure(
            id,
            Status::FailExecute,
            format!("request failed with status: {status_code} | {text}"),
        );
    }

    let mut decoded: ClientResponse = match http_response.json().await {
        Ok(decoded) => decoded,
        Err(err) => return ClientResponse::failure(id, Status::FailUnmarshal, err.to_string()),
    };

    if decoded.compute_time_secs <= 0.0 || decoded.storage_time_secs <= 0.0 {
        return ClientResponse::failure(
            id,
            Status::FailUnmarshal,
            "invalid response: zero compute or storage time",
        );
    }

    decoded.id = id;
    decoded.status = Status::Success;
    decoded.latency = start.elapsed();
    arbiter.finish(&decoded);
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PyxisConfig;
    use crate::taskmix::TaskProfile;
    use crate::types::Payload;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    fn profile() -> PyxisConfig {
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

    fn request() -> ClientRequest {
        ClientRequest {
            id: "req-1".to_owned(),
            type_id: 0,
            payload: Payload::DefaultFunc {
                storage_keys: vec!["k0".to_owned()],
                compute_secs: 0.1,
            },
        }
    }

    async fn spawn_stub(
        response: ClientResponse,
    ) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), String> {
        let app = Router::new().route(
            "/",
            post(move || {
                let response = response.clone();
                async move { Json(response) }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| err.to_string())?;
        let addr = listener.local_addr().map_err(|err| err.to_string())?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok((addr, handle))
    }

    #[tokio::test]
    async fn successful_round_trip_reports_success_and_calls_finish() -> Result<(), String> {
        let stub_response = ClientResponse {
            id: String::new(),
            status: Status::Success,
            result: None,
            storage_time_secs: 0.2,
            compute_time_secs: 0.3,
            latency: Duration::ZERO,
        };
        let (addr, _server) = spawn_stub(stub_response).await?;
        let url = format!("http://{addr}/");

        let pyxis = crate::arbiter::Pyxis::new(&profile()).map_err(|err| err.to_string())?;
        let client = reqwest::Client::new();

        let response = handle_request(&client, &pyxis, &url, &url, request()).await;

        assert_eq!(response.status, Status::Success);
        assert_eq!(response.id, "req-1");
        assert!(response.latency > Duration::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn zero_compute_time_is_treated_as_unmarshal_failure() -> Result<(), String> {
        let stub_response = ClientResponse {
            id: String::new(),
            status: Status::Success,
            result: None,
            storage_time_secs: 0.2,
            compute_time_secs: 0.0,
            latency: Duration::ZERO,
        };
        let (addr, _server) = spawn_stub(stub_response).await?;
        let url = format!("http://{addr}/");

        let pyxis = crate::arbiter::Pyxis::new(&profile()).map_err(|err| err.to_string())?;
        let client = reqwest::Client::new();

        let response = handle_request(&client, &pyxis, &url, &url, request()).await;

        assert_eq!(response.status, Status::FailUnmarshal);
        Ok(())
    }

    #[tokio::test]
    async fn transport_failure_reports_fail_send() -> Result<(), String> {
        let pyxis = crate::arbiter::Pyxis::new(&profile()).map_err(|err| err.to_string())?;
        let client = reqwest::Client::new();
        let unreachable_url = "http://127.0.0.1:1";

        let response =
            handle_request(&client, &pyxis, unreachable_url, unreachable_url, request()).await;

        assert_eq!(response.status, Status::FailSend);
        Ok(())
    }
}
