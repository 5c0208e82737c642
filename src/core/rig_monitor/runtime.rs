//! Tokio runtime hosting the alarm tasks.
//!
//! Polling stays on the caller's thread; only the notification and the
//! audible alarm run here, so a pending acknowledgment never delays a tick.

use std::time::Duration;

use tokio::runtime::{Handle, Runtime};

/// Wrapper around the runtime that executes presenter tasks
pub struct AlarmRuntime {
    runtime: Runtime,
}

impl AlarmRuntime {
    pub fn new() -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("alarm-worker")
            .build()?;

        log::debug!("Alarm runtime started");

        Ok(Self { runtime })
    }

    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    /// Shutdown the runtime, giving running tasks a moment to finish.
    pub fn shutdown(self) {
        log::debug!("Shutting down alarm runtime");
        self.runtime.shutdown_timeout(Duration::from_millis(250));
    }
}
