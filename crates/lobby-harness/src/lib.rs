//! Deterministic simulation harness for Lobby.
//!
//! An in-memory [`MemoryBroker`] replaces the MQTT broker and a
//! [`SimDriver`] plugs it into [`lobby_app::Runtime`], so several clients can
//! run the production orchestration code in one test with no network.
//!
//! Delivery is synchronous and inbound work is queued on each runtime's
//! mailbox. [`settle`] pumps a set of runtimes until none has queued work.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod broker;
pub mod sim_driver;

use lobby_app::Runtime;
use lobby_client::{Namespace, Session, Username};
use lobby_proto::ProtocolError;

pub use broker::{BrokerError, MemoryBroker, SubscriberId};
pub use sim_driver::{SimDriver, SimDriverError};

/// Runtime for `username` on `broker` under the default namespace.
pub fn sim_runtime(
    broker: &MemoryBroker,
    username: &str,
) -> Result<Runtime<SimDriver>, ProtocolError> {
    let session = Session::new(Username::new(username)?, Namespace::default());
    Ok(Runtime::new(SimDriver::new(broker.clone()), session))
}

/// Run queued inbound work on every runtime until all mailboxes are empty.
///
/// Returns the total number of jobs run.
pub async fn settle(runtimes: &mut [&mut Runtime<SimDriver>]) -> Result<usize, SimDriverError> {
    let mut total = 0;
    loop {
        let mut ran = 0;
        for runtime in runtimes.iter_mut() {
            ran += runtime.run_pending().await?;
        }
        if ran == 0 {
            return Ok(total);
        }
        total += ran;
    }
}
