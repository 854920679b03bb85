//! Driver for networks without connectivity.

use std::collections::HashSet;

use parking_lot::Mutex;

use super::{Driver, DriverError};
use crate::types::{EndpointId, NetworkId, Options};

pub const NETWORK_TYPE: &str = "null";

/// Provisions nothing. It keeps just enough state to reject operations
/// against identifiers it never saw.
#[derive(Default)]
pub struct NullDriver {
    networks: Mutex<HashSet<NetworkId>>,
    endpoints: Mutex<HashSet<EndpointId>>,
}

impl NullDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Driver for NullDriver {
    fn network_type(&self) -> &str {
        NETWORK_TYPE
    }

    fn config(&self, _options: &Options) -> Result<(), DriverError> {
        Ok(())
    }

    fn create_network(&self, id: &NetworkId, _options: &Options) -> Result<(), DriverError> {
        self.networks.lock().insert(id.clone());
        tracing::debug!(network = %id, "null driver network created");
        Ok(())
    }

    fn delete_network(&self, id: &NetworkId) -> Result<(), DriverError> {
        if !self.networks.lock().remove(id) {
            return Err(DriverError::NoSuchNetwork(id.clone()));
        }
        Ok(())
    }

    fn create_endpoint(
        &self,
        network: &NetworkId,
        endpoint: &EndpointId,
        _options: &Options,
    ) -> Result<(), DriverError> {
        if !self.networks.lock().contains(network) {
            return Err(DriverError::NoSuchNetwork(network.clone()));
        }
        self.endpoints.lock().insert(endpoint.clone());
        Ok(())
    }

    fn delete_endpoint(&self, _network: &NetworkId, endpoint: &EndpointId) -> Result<(), DriverError> {
        if !self.endpoints.lock().remove(endpoint) {
            return Err(DriverError::NoSuchEndpoint(endpoint.clone()));
        }
        Ok(())
    }

    fn join(
        &self,
        _network: &NetworkId,
        endpoint: &EndpointId,
        _sandbox_key: &str,
    ) -> Result<(), DriverError> {
        // nothing to move into the sandbox for a network without connectivity
        if !self.endpoints.lock().contains(endpoint) {
            return Err(DriverError::NoSuchEndpoint(endpoint.clone()));
        }
        Ok(())
    }

    fn leave(&self, _network: &NetworkId, endpoint: &EndpointId) -> Result<(), DriverError> {
        if !self.endpoints.lock().contains(endpoint) {
            return Err(DriverError::NoSuchEndpoint(endpoint.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_lifecycle() -> Result<(), DriverError> {
        let driver = NullDriver::new();
        let network = NetworkId::random();
        let endpoint = EndpointId::random();

        driver.config(&Options::default())?;
        driver.create_network(&network, &Options::default())?;
        driver.create_endpoint(&network, &endpoint, &Options::default())?;
        driver.join(&network, &endpoint, "/var/run/netns/c1")?;
        driver.leave(&network, &endpoint)?;
        driver.delete_endpoint(&network, &endpoint)?;
        driver.delete_network(&network)?;

        Ok(())
    }

    #[test]
    fn test_delete_unknown_network() {
        let driver = NullDriver::new();
        let err = driver.delete_network(&NetworkId::random()).unwrap_err();
        assert!(matches!(err, DriverError::NoSuchNetwork(_)));
    }

    #[test]
    fn test_endpoint_requires_network() {
        let driver = NullDriver::new();
        let err = driver
            .create_endpoint(&NetworkId::random(), &EndpointId::random(), &Options::default())
            .unwrap_err();
        assert!(matches!(err, DriverError::NoSuchNetwork(_)));
    }

    #[test]
    fn test_join_unknown_endpoint() {
        let driver = NullDriver::new();
        let network = NetworkId::random();
        driver.create_network(&network, &Options::default()).unwrap();

        let err = driver
            .join(&network, &EndpointId::random(), "/var/run/netns/c1")
            .unwrap_err();
        assert!(matches!(err, DriverError::NoSuchEndpoint(_)));
    }
}
