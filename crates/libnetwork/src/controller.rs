use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::driver::{self, Driver, DriverTable};
use crate::error::LibnetworkError;
use crate::network::Network;
use crate::sandbox::null::NullSandboxProvider;
use crate::sandbox::{Sandbox, SandboxProvider};
use crate::types::{NetworkId, Options};

type Result<T> = std::result::Result<T, LibnetworkError>;

/// Shared sandbox handle plus the number of joins holding it.
struct SandboxEntry {
    sandbox: Arc<dyn Sandbox>,
    ref_cnt: usize,
}

#[derive(Default)]
struct NetworkTable {
    live: HashMap<NetworkId, Arc<Network>>,
    // names claimed by in-flight creates; released when the create resolves
    reserved: HashSet<String>,
}

impl NetworkTable {
    fn name_in_use(&self, name: &str) -> bool {
        self.reserved.contains(name) || self.live.values().any(|n| n.name() == name)
    }
}

/// State shared between the controller and the entities it hands out.
/// Networks and endpoints keep weak references back to it, so dropping the
/// controller invalidates them instead of leaking the tables.
pub(crate) struct ControllerState {
    drivers: DriverTable,
    sandbox_provider: Arc<dyn SandboxProvider>,
    networks: Mutex<NetworkTable>,
    sandboxes: Mutex<HashMap<String, SandboxEntry>>,
}

impl ControllerState {
    /// Returns the sandbox for `key`, creating it on first use. Each call
    /// takes one reference; the provider runs under the table lock so
    /// concurrent adds for one key can never create twins.
    pub(crate) fn sandbox_add(&self, key: &str) -> Result<Arc<dyn Sandbox>> {
        let mut sandboxes = self.sandboxes.lock();

        if let Some(entry) = sandboxes.get_mut(key) {
            entry.ref_cnt += 1;
            return Ok(Arc::clone(&entry.sandbox));
        }

        let sandbox = self.sandbox_provider.new_sandbox(key)?;
        tracing::debug!(key, sandbox = sandbox.key(), "sandbox created");
        sandboxes.insert(
            key.to_string(),
            SandboxEntry {
                sandbox: Arc::clone(&sandbox),
                ref_cnt: 1,
            },
        );
        Ok(sandbox)
    }

    /// Drops one reference to the sandbox for `key`. The last drop destroys
    /// the sandbox and removes the entry inside the same critical section,
    /// so a concurrent add observes either a live entry or none.
    pub(crate) fn sandbox_rm(&self, key: &str) -> Result<()> {
        let mut sandboxes = self.sandboxes.lock();

        match sandboxes.get_mut(key) {
            None => Err(LibnetworkError::UnknownSandboxKey(key.to_string())),
            Some(entry) if entry.ref_cnt > 1 => {
                entry.ref_cnt -= 1;
                Ok(())
            }
            Some(_) => {
                if let Some(entry) = sandboxes.remove(key) {
                    if let Err(err) = entry.sandbox.destroy() {
                        tracing::warn!(key, error = %err, "sandbox teardown failed");
                    }
                    tracing::debug!(key, "sandbox destroyed");
                }
                Ok(())
            }
        }
    }

    /// Looks the sandbox for `key` up without taking a reference.
    pub(crate) fn sandbox_get(&self, key: &str) -> Option<Arc<dyn Sandbox>> {
        self.sandboxes
            .lock()
            .get(key)
            .map(|entry| Arc::clone(&entry.sandbox))
    }
}

/// Manages networks, their drivers and the sandboxes containers join.
///
/// All operations are safe to call from multiple threads. Locks protect
/// only the tables themselves; driver calls run outside of them.
pub struct Controller {
    pub(crate) state: Arc<ControllerState>,
}

impl Controller {
    /// A controller with the statically known drivers and an inert sandbox
    /// provider. Use [`ControllerBuilder`] to plug in real ones.
    pub fn new() -> Self {
        ControllerBuilder::default().build()
    }

    fn resolve_driver(&self, network_type: &str) -> Result<&Arc<dyn Driver>> {
        self.state
            .drivers
            .get(network_type)
            .ok_or_else(|| LibnetworkError::UnknownDriverType(network_type.to_string()))
    }

    /// Applies the passed options to the driver registered for
    /// `network_type`. Whatever the driver returns is handed back untouched.
    pub fn configure_network_driver(&self, network_type: &str, options: &Options) -> Result<()> {
        let driver = self.resolve_driver(network_type)?;
        driver.config(options)?;
        Ok(())
    }

    /// Creates a network of the given type. The name is claimed before the
    /// driver runs and released again if it fails, so no two live networks
    /// ever share a name, also under concurrent creates.
    pub fn new_network(&self, network_type: &str, name: &str, options: &Options) -> Result<Arc<Network>> {
        let driver = Arc::clone(self.resolve_driver(network_type)?);

        {
            let mut table = self.state.networks.lock();
            if table.name_in_use(name) {
                return Err(LibnetworkError::DuplicateName(name.to_string()));
            }
            table.reserved.insert(name.to_string());
        }

        let network = Arc::new(Network::new(name, driver, Arc::downgrade(&self.state)));

        if let Err(err) = network.driver().create_network(network.id(), options) {
            self.state.networks.lock().reserved.remove(name);
            return Err(err.into());
        }

        let mut table = self.state.networks.lock();
        table.reserved.remove(name);
        table.live.insert(network.id().clone(), Arc::clone(&network));
        drop(table);

        tracing::debug!(network = %network.id(), name, network_type, "network created");
        Ok(network)
    }

    /// Removes a network, tearing down its driver-side state. Fails while
    /// endpoints are still attached; the network stays registered if the
    /// driver fails.
    pub fn remove_network(&self, id: &str) -> Result<()> {
        let network = self
            .network_by_id(id)
            .ok_or_else(|| LibnetworkError::NoSuchNetwork(id.to_string()))?;

        if network.endpoint_count() > 0 {
            return Err(LibnetworkError::ActiveEndpoints(network.name().to_string()));
        }

        network.driver().delete_network(network.id())?;

        self.state.networks.lock().live.remove(id);
        tracing::debug!(network = id, name = network.name(), "network removed");
        Ok(())
    }

    /// Point-in-time snapshot of the registered networks. Later mutations
    /// of the registry do not affect the returned list.
    pub fn networks(&self) -> Vec<Arc<Network>> {
        self.state.networks.lock().live.values().cloned().collect()
    }

    /// Visits a snapshot of the networks in no particular order, stopping
    /// the first time `walker` returns true.
    pub fn walk_networks<F>(&self, mut walker: F)
    where
        F: FnMut(&Arc<Network>) -> bool,
    {
        for network in self.networks() {
            if walker(&network) {
                return;
            }
        }
    }

    /// First network carrying `name`, if any. An empty name never matches.
    pub fn network_by_name(&self, name: &str) -> Option<Arc<Network>> {
        if name.is_empty() {
            return None;
        }

        let mut found = None;
        self.walk_networks(|network| {
            if network.name() == name {
                found = Some(Arc::clone(network));
                return true;
            }
            false
        });
        found
    }

    pub fn network_by_id(&self, id: &str) -> Option<Arc<Network>> {
        self.state.networks.lock().live.get(id).cloned()
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles a [`Controller`]. Drivers register under their network type;
/// registering a second driver for the same type replaces the first.
pub struct ControllerBuilder {
    drivers: DriverTable,
    sandbox_provider: Arc<dyn SandboxProvider>,
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self {
            drivers: driver::enumerate(),
            sandbox_provider: Arc::new(NullSandboxProvider),
        }
    }
}

impl ControllerBuilder {
    pub fn with_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        let network_type = driver.network_type().to_string();
        self.drivers.insert(network_type, driver);
        self
    }

    pub fn with_sandbox_provider(mut self, provider: Arc<dyn SandboxProvider>) -> Self {
        self.sandbox_provider = provider;
        self
    }

    pub fn build(self) -> Controller {
        Controller {
            state: Arc::new(ControllerState {
                drivers: self.drivers,
                sandbox_provider: self.sandbox_provider,
                networks: Mutex::new(NetworkTable::default()),
                sandboxes: Mutex::new(HashMap::new()),
            }),
        }
    }
}
