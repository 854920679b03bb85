//! An interface trait so that the controller can acquire and release
//! isolated network environments without having to worry about how they
//! are implemented.

pub mod null;
pub mod test;

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to set up sandbox for key {key}: {msg}")]
    Create { key: String, msg: String },
    #[error("failed to tear down sandbox {key}: {msg}")]
    Destroy { key: String, msg: String },
}

/// A shared handle to an isolated network environment.
pub trait Sandbox: Send + Sync {
    /// Access key of the environment, typically the bind-mount path of a
    /// network namespace.
    fn key(&self) -> &str;

    /// Tears the environment down. The controller calls this exactly once,
    /// when the last reference to the sandbox is released.
    fn destroy(&self) -> Result<(), SandboxError>;
}

/// Creates sandboxes on demand for the controller's sandbox table.
pub trait SandboxProvider: Send + Sync {
    fn new_sandbox(&self, key: &str) -> Result<Arc<dyn Sandbox>, SandboxError>;
}
