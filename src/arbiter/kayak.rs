use async_trait::async_trait;
use rand::Rng;

use crate::config::KayakConfig;
use crate::error::TaskMixError;
use crate::shutdown::ShutdownReceiver;
use crate::taskmix::TaskBoundaries;
use crate::types::{ClientRequest, ClientResponse, Destination};

use super::Arbiter;

/// A fixed Bernoulli arbiter, retained for contrast with Pyxis.
///
/// `Schedule` ignores the request's `typeID` entirely; `Finish` is a no-op;
/// `Run` simply blocks until shutdown.
pub struct Kayak {
    start_point: f64,
}

impl Kayak {
    /// Builds a baseline arbiter from its config.
    ///
    /// # Errors
    ///
    /// Returns [`TaskMixError`] if `config.task_profiles` fails validation,
    /// even though Kayak's routing decision does not consult them — the
    /// mixture is still part of the recognized config surface (§6) and its
    /// construction-time checks are not framework-specific.
    pub fn new(config: &KayakConfig) -> Result<Self, TaskMixError> {
        TaskBoundaries::from_profiles(&config.task_profiles)?;
        Ok(Kayak {
            start_point: config.start_point,
        })
    }
}

#[async_trait]
impl Arbiter for Kayak {
    fn schedule(&self, _request: &ClientRequest) -> Option<Destination> {
        Some(if rand::thread_rng().gen::<f64>() < self.start_point {
            Destination::ToCompute
        } else {
            Destination::ToStorage
        })
    }

    fn finish(&self, _response: &ClientResponse) {}

    async fn run(&self, mut shutdown: ShutdownReceiver) {
        let _ = shutdown.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taskmix::TaskProfile;

    fn config(start_point: f64) -> KayakConfig {
        KayakConfig {
            start_point,
            interval_secs: 1.0,
            task_profiles: vec![TaskProfile {
                type_id: 0,
                percentage: 1.0,
                num_kv: 4,
                compute_secs: 0.1,
            }],
        }
    }

    #[test]
    fn schedule_ignores_type_id_and_samples_start_point() -> Result<(), String> {
        let kayak = Kayak::new(&config(1.0)).map_err(|err| err.to_string())?;
        let req = ClientRequest {
            id: "r".to_owned(),
            type_id: 99,
            payload: crate::types::Payload::DefaultFunc {
                storage_keys: vec![],
                compute_secs: 0.0,
            },
        };
        for _ in 0..100 {
            assert_eq!(kayak.schedule(&req), Some(Destination::ToCompute));
        }
        Ok(())
    }

    #[test]
    fn rejects_invalid_task_mix_at_construction() {
        let mut bad_config = config(0.5);
        bad_config.task_profiles = vec![];
        assert!(Kayak::new(&bad_config).is_err());
    }
}
