//! Control core for container networking.
//!
//! The crate tracks logical networks, the endpoints attached to them and
//! the reference-counted sandboxes containers use to reach those
//! endpoints, and dispatches provisioning work to pluggable network-type
//! drivers.
//!
//! ```no_run
//! use libnetwork::controller::Controller;
//! use libnetwork::types::Options;
//!
//! # fn main() -> Result<(), libnetwork::error::LibnetworkError> {
//! let controller = Controller::new();
//!
//! // select and configure the driver for the networks we are about to create
//! controller.configure_network_driver("null", &Options::default())?;
//!
//! // a network for containers to join
//! let network = controller.new_network("null", "network1", &Options::default())?;
//!
//! // one attachment point per container
//! let endpoint = network.create_endpoint("endpoint1", &Options::default())?;
//!
//! // joining binds the container to a sandbox shared by all of its
//! // endpoints; the returned key gives access to it for inspection
//! let sandbox_key = endpoint.join("container1")?;
//! # let _ = sandbox_key;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod network;
pub mod sandbox;
pub mod types;
