use thiserror::Error;

/// Orchestration failures encountered outside the per-request handler state
/// machine (which reports its own failures on `ClientResponse.status` instead
/// of propagating a `Result`).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Ingress channel closed before shutdown.")]
    IngressClosed,
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}
