use crate::driver::DriverError;
use crate::sandbox::SandboxError;

/// Errors returned by the public surface of the crate. Driver and sandbox
/// failures pass through unmodified; callers decide whether to retry.
#[derive(Debug, thiserror::Error)]
pub enum LibnetworkError {
    #[error("unknown network type {0}")]
    UnknownDriverType(String),
    #[error("network name {0} is already in use")]
    DuplicateName(String),
    #[error("no network with id {0}")]
    NoSuchNetwork(String),
    #[error("no endpoint with id {0}")]
    NoSuchEndpoint(String),
    #[error("network {0} still has endpoints attached")]
    ActiveEndpoints(String),
    #[error("no sandbox for key {0}")]
    UnknownSandboxKey(String),
    #[error("the owning controller is no longer available")]
    ControllerUnavailable,
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}
