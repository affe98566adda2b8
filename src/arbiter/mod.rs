//! The placement controller: owns the turning point x and decides routing.
mod kayak;
mod pyxis;

pub use kayak::Kayak;
pub use pyxis::{Pyxis, RANGE};

use async_trait::async_trait;

use crate::shutdown::ShutdownReceiver;
use crate::types::{ClientRequest, ClientResponse, Destination};

/// The capability set shared by the Pyxis controller and the Kayak baseline.
///
/// The dispatcher holds this behind a trait object so either framework can be
/// swapped in without touching dispatch code (design note: capability-pattern
/// polymorphism in place of an interface-typed field).
#[async_trait]
pub trait Arbiter: Send + Sync {
    /// Decides a destination for `request`. `None` signals an invalid
    /// decision (e.g. an unrecognized `typeID`), which the caller reports as
    /// `FAIL_SCHEDULE`. Wait-free; safe under concurrent callers.
    fn schedule(&self, request: &ClientRequest) -> Option<Destination>;

    /// Notifies the controller of one successfully completed request.
    /// Must not block.
    fn finish(&self, response: &ClientResponse);

    /// Runs the control loop until `shutdown` fires.
    async fn run(&self, shutdown: ShutdownReceiver);
}
