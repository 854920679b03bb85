//! An interface trait so that the controller can dispatch provisioning
//! work to network-type specific drivers without having to worry about
//! their implementation details.

pub mod null;

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{EndpointId, NetworkId, Options};

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("invalid driver options: {0}")]
    InvalidOptions(String),
    #[error("no network {0} known to driver")]
    NoSuchNetwork(NetworkId),
    #[error("no endpoint {0} known to driver")]
    NoSuchEndpoint(EndpointId),
    #[error("{msg}")]
    Provision {
        msg: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

type Result<T> = std::result::Result<T, DriverError>;

/// Network-type specific provisioning logic. One driver instance serves
/// every network of its type; implementations guard their own internal
/// state, so all methods take `&self`.
pub trait Driver: Send + Sync {
    /// The network type this driver provisions, used as its registry key.
    fn network_type(&self) -> &str;

    /// Applies driver-wide configuration.
    fn config(&self, options: &Options) -> Result<()>;

    /// Provisions the backing state for a new network.
    fn create_network(&self, id: &NetworkId, options: &Options) -> Result<()>;

    /// Tears down the backing state of a network.
    fn delete_network(&self, id: &NetworkId) -> Result<()>;

    /// Provisions interfaces and addressing for an endpoint on `network`.
    fn create_endpoint(
        &self,
        network: &NetworkId,
        endpoint: &EndpointId,
        options: &Options,
    ) -> Result<()>;

    /// Releases the resources held by an endpoint.
    fn delete_endpoint(&self, network: &NetworkId, endpoint: &EndpointId) -> Result<()>;

    /// Moves the endpoint's interfaces into the sandbox identified by
    /// `sandbox_key`.
    fn join(&self, network: &NetworkId, endpoint: &EndpointId, sandbox_key: &str) -> Result<()>;

    /// Detaches the endpoint's interfaces from its current sandbox.
    fn leave(&self, network: &NetworkId, endpoint: &EndpointId) -> Result<()>;
}

pub(crate) type DriverTable = HashMap<String, Arc<dyn Driver>>;

/// Statically known drivers, registered once at controller construction.
pub(crate) fn enumerate() -> DriverTable {
    let mut drivers = DriverTable::new();
    let null: Arc<dyn Driver> = Arc::new(null::NullDriver::new());
    drivers.insert(null.network_type().to_string(), null);
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_registers_null() {
        let drivers = enumerate();
        assert!(drivers.contains_key(null::NETWORK_TYPE));
    }
}
