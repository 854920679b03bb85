//! Inert sandboxes, paired with networks that have no connectivity.

use std::sync::Arc;

use super::{Sandbox, SandboxError, SandboxProvider};

const KEY_ROOT: &str = "/var/run/netns";

/// Hands out bookkeeping handles that are not backed by an OS namespace.
#[derive(Default)]
pub struct NullSandboxProvider;

struct NullSandbox {
    key: String,
}

impl Sandbox for NullSandbox {
    fn key(&self) -> &str {
        &self.key
    }

    fn destroy(&self) -> Result<(), SandboxError> {
        tracing::debug!(sandbox = self.key.as_str(), "inert sandbox destroyed");
        Ok(())
    }
}

impl SandboxProvider for NullSandboxProvider {
    fn new_sandbox(&self, key: &str) -> Result<Arc<dyn Sandbox>, SandboxError> {
        Ok(Arc::new(NullSandbox {
            key: format!("{KEY_ROOT}/{key}"),
        }))
    }
}
