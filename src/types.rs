//! Wire types shared by the client, the gateway, and the compute/storage tiers.
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the dispatcher sent a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    ToCompute,
    ToStorage,
}

/// Outcome recorded on a `ClientResponse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    FailMarshal,
    FailSchedule,
    FailSend,
    FailExecute,
    FailUnmarshal,
}

impl Default for Status {
    fn default() -> Self {
        Status::Success
    }
}

/// A task's keys-and-compute payload, or its pointer-chasing variant.
///
/// Tagged union replacing the source's embedded-pointer discrimination: exactly
/// one variant is ever populated, so matching is exhaustive instead of relying
/// on which optional field happens to be non-null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Payload {
    DefaultFunc {
        storage_keys: Vec<String>,
        compute_secs: f64,
    },
    PointerChasing {
        initial_key: String,
        num_hops: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    pub id: String,
    pub type_id: u32,
    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default)]
    pub storage_time_secs: f64,
    #[serde(default)]
    pub compute_time_secs: f64,
    #[serde(skip, default)]
    pub latency: Duration,
}

impl ClientResponse {
    #[must_use]
    pub fn failure(id: String, status: Status, result: impl Into<String>) -> Self {
        ClientResponse {
            id,
            status,
            result: Some(result.into()),
            storage_time_secs: 0.0,
            compute_time_secs: 0.0,
            latency: Duration::ZERO,
        }
    }
}
