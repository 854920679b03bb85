use std::sync::{Arc, Weak};

use crate::controller::ControllerState;
use crate::driver::Driver;
use crate::error::LibnetworkError;
use crate::types::{EndpointId, NetworkId};

type Result<T> = std::result::Result<T, LibnetworkError>;

/// A container's attachment point on exactly one network.
pub struct Endpoint {
    id: EndpointId,
    name: String,
    network_id: NetworkId,
    driver: Arc<dyn Driver>,
    ctrl: Weak<ControllerState>,
}

impl Endpoint {
    pub(crate) fn new(
        name: &str,
        network_id: NetworkId,
        driver: Arc<dyn Driver>,
        ctrl: Weak<ControllerState>,
    ) -> Self {
        Self {
            id: EndpointId::random(),
            name: name.to_string(),
            network_id,
            driver,
            ctrl,
        }
    }

    pub fn id(&self) -> &EndpointId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the network this endpoint belongs to.
    pub fn network_id(&self) -> &NetworkId {
        &self.network_id
    }

    fn controller(&self) -> Result<Arc<ControllerState>> {
        self.ctrl
            .upgrade()
            .ok_or(LibnetworkError::ControllerUnavailable)
    }

    /// Binds `container_key` to a sandbox shared by every join with the
    /// same key, then asks the driver to attach this endpoint's interfaces
    /// to it. Returns the sandbox access key for inspection use.
    pub fn join(&self, container_key: &str) -> Result<String> {
        let ctrl = self.controller()?;

        let sandbox = ctrl.sandbox_add(container_key)?;
        if let Err(err) = self.driver.join(&self.network_id, &self.id, sandbox.key()) {
            // release the reference taken above so a failed attach does
            // not pin the sandbox
            if let Err(rm_err) = ctrl.sandbox_rm(container_key) {
                tracing::warn!(key = container_key, error = %rm_err, "sandbox rollback failed");
            }
            return Err(err.into());
        }

        tracing::debug!(endpoint = %self.id, key = container_key, sandbox = sandbox.key(), "joined");
        Ok(sandbox.key().to_string())
    }

    /// Detaches this endpoint from the container's sandbox and drops the
    /// sandbox reference taken by [`Endpoint::join`].
    pub fn leave(&self, container_key: &str) -> Result<()> {
        let ctrl = self.controller()?;

        if ctrl.sandbox_get(container_key).is_none() {
            return Err(LibnetworkError::UnknownSandboxKey(container_key.to_string()));
        }

        self.driver.leave(&self.network_id, &self.id)?;
        ctrl.sandbox_rm(container_key)?;

        tracing::debug!(endpoint = %self.id, key = container_key, "left");
        Ok(())
    }
}
