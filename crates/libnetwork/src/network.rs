use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::controller::ControllerState;
use crate::driver::Driver;
use crate::endpoint::Endpoint;
use crate::error::LibnetworkError;
use crate::types::{EndpointId, NetworkId, Options};

type Result<T> = std::result::Result<T, LibnetworkError>;

/// A named logical network bound to one driver instance. Networks are
/// created through [`crate::controller::Controller::new_network`] and own
/// the endpoints attached to them.
pub struct Network {
    id: NetworkId,
    name: String,
    driver: Arc<dyn Driver>,
    ctrl: Weak<ControllerState>,
    // per-network table so endpoint churn on one network does not
    // serialize the others behind the controller lock
    endpoints: Mutex<HashMap<EndpointId, Arc<Endpoint>>>,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Network {
    pub(crate) fn new(name: &str, driver: Arc<dyn Driver>, ctrl: Weak<ControllerState>) -> Self {
        Self {
            id: NetworkId::random(),
            name: name.to_string(),
            driver,
            ctrl,
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &NetworkId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub(crate) fn endpoint_count(&self) -> usize {
        self.endpoints.lock().len()
    }

    /// Creates an endpoint on this network. Interface provisioning is
    /// delegated to the driver; the endpoint is registered only if the
    /// driver succeeds.
    pub fn create_endpoint(&self, name: &str, options: &Options) -> Result<Arc<Endpoint>> {
        let endpoint = Arc::new(Endpoint::new(
            name,
            self.id.clone(),
            Arc::clone(&self.driver),
            self.ctrl.clone(),
        ));

        self.driver.create_endpoint(&self.id, endpoint.id(), options)?;

        self.endpoints
            .lock()
            .insert(endpoint.id().clone(), Arc::clone(&endpoint));
        tracing::debug!(network = %self.id, endpoint = %endpoint.id(), name, "endpoint created");

        Ok(endpoint)
    }

    /// Removes an endpoint from this network, releasing its driver-side
    /// resources. The endpoint stays registered if the driver fails.
    pub fn remove_endpoint(&self, id: &str) -> Result<()> {
        let endpoint = self
            .endpoints
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| LibnetworkError::NoSuchEndpoint(id.to_string()))?;

        self.driver.delete_endpoint(&self.id, endpoint.id())?;

        self.endpoints.lock().remove(id);
        tracing::debug!(network = %self.id, endpoint = id, "endpoint removed");
        Ok(())
    }

    /// Point-in-time snapshot of the endpoints attached to this network.
    pub fn endpoints(&self) -> Vec<Arc<Endpoint>> {
        self.endpoints.lock().values().cloned().collect()
    }

    pub fn endpoint_by_id(&self, id: &str) -> Option<Arc<Endpoint>> {
        self.endpoints.lock().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;

    use crate::controller::{Controller, ControllerBuilder};
    use crate::driver::test::{DriverCall, TestDriver};
    use crate::sandbox::test::TestSandboxProvider;
    use crate::types::Options;

    fn test_controller() -> (Controller, Arc<TestDriver>) {
        let driver = Arc::new(TestDriver::new());
        let controller = ControllerBuilder::default()
            .with_driver(driver.clone())
            .with_sandbox_provider(Arc::new(TestSandboxProvider::new()))
            .build();
        (controller, driver)
    }

    #[test]
    fn test_create_endpoint_registers() -> Result<()> {
        let (controller, driver) = test_controller();
        let network = controller.new_network("test", "net1", &Options::default())?;

        let endpoint = network.create_endpoint("ep1", &Options::default())?;

        assert_eq!(endpoint.name(), "ep1");
        assert_eq!(endpoint.network_id(), network.id());
        assert_eq!(network.endpoints().len(), 1);
        assert!(network.endpoint_by_id(endpoint.id().as_str()).is_some());
        assert!(driver.calls().contains(&DriverCall::CreateEndpoint(
            network.id().clone(),
            endpoint.id().clone()
        )));
        Ok(())
    }

    #[test]
    fn test_create_endpoint_driver_failure_not_registered() -> Result<()> {
        let (controller, driver) = test_controller();
        let network = controller.new_network("test", "net1", &Options::default())?;

        driver.fail_next("create_endpoint", 1);
        assert!(network.create_endpoint("ep1", &Options::default()).is_err());
        assert!(network.endpoints().is_empty());

        // the failure is spent, the next attempt goes through
        network.create_endpoint("ep1", &Options::default())?;
        assert_eq!(network.endpoints().len(), 1);
        Ok(())
    }

    #[test]
    fn test_remove_endpoint() -> Result<()> {
        let (controller, driver) = test_controller();
        let network = controller.new_network("test", "net1", &Options::default())?;
        let endpoint = network.create_endpoint("ep1", &Options::default())?;

        network.remove_endpoint(endpoint.id().as_str())?;

        assert!(network.endpoints().is_empty());
        assert!(driver.calls().contains(&DriverCall::DeleteEndpoint(
            network.id().clone(),
            endpoint.id().clone()
        )));
        Ok(())
    }

    #[test]
    fn test_remove_endpoint_unknown() -> Result<()> {
        let (controller, _driver) = test_controller();
        let network = controller.new_network("test", "net1", &Options::default())?;

        assert!(network.remove_endpoint("no-such-endpoint").is_err());
        Ok(())
    }

    #[test]
    fn test_remove_endpoint_driver_failure_keeps_registration() -> Result<()> {
        let (controller, driver) = test_controller();
        let network = controller.new_network("test", "net1", &Options::default())?;
        let endpoint = network.create_endpoint("ep1", &Options::default())?;

        driver.fail_next("delete_endpoint", 1);
        assert!(network.remove_endpoint(endpoint.id().as_str()).is_err());
        assert_eq!(network.endpoints().len(), 1);
        Ok(())
    }
}
