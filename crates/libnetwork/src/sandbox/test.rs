//! Contains a recording sandbox provider for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Sandbox, SandboxError, SandboxProvider};

#[derive(Default)]
struct ProviderState {
    created: Vec<String>,
    destroyed: Vec<String>,
    fail_create: usize,
}

/// Tracks which keys were given sandboxes and which sandboxes were torn
/// down, and fails creation on demand.
#[derive(Default)]
pub struct TestSandboxProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl TestSandboxProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `times` sandbox creations fail.
    pub fn fail_next_create(&self, times: usize) {
        self.state.lock().fail_create = times;
    }

    /// Keys that were handed a sandbox, in creation order.
    pub fn created(&self) -> Vec<String> {
        self.state.lock().created.clone()
    }

    /// Keys whose sandbox was destroyed, in teardown order.
    pub fn destroyed(&self) -> Vec<String> {
        self.state.lock().destroyed.clone()
    }
}

struct TestSandbox {
    key: String,
    access_key: String,
    state: Arc<Mutex<ProviderState>>,
}

impl Sandbox for TestSandbox {
    fn key(&self) -> &str {
        &self.access_key
    }

    fn destroy(&self) -> Result<(), SandboxError> {
        self.state.lock().destroyed.push(self.key.clone());
        Ok(())
    }
}

impl SandboxProvider for TestSandboxProvider {
    fn new_sandbox(&self, key: &str) -> Result<Arc<dyn Sandbox>, SandboxError> {
        let mut state = self.state.lock();
        if state.fail_create > 0 {
            state.fail_create -= 1;
            return Err(SandboxError::Create {
                key: key.to_string(),
                msg: "injected create failure".to_string(),
            });
        }

        state.created.push(key.to_string());
        Ok(Arc::new(TestSandbox {
            key: key.to_string(),
            access_key: format!("/test/netns/{key}"),
            state: Arc::clone(&self.state),
        }))
    }
}
