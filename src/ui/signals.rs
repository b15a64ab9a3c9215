use crate::error::{Result, ScoreWdError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct GracefulShutdown {
    running: Arc<AtomicBool>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown_message_shown = AtomicBool::new(false);

        let running_clone = running.clone();

        // First Ctrl+C stops after killing the running export, the second one exits at once
        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);

            if !shutdown_message_shown.swap(true, Ordering::SeqCst) {
                eprintln!("\n🛑 Stopping export... (press Ctrl+C again to force exit)");
            } else {
                eprintln!("\n💀 Force stopping...");
                std::process::exit(130);
            }
        })
        .map_err(|e| ScoreWdError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self { running })
    }

    /// Create a GracefulShutdown instance for testing (no signal handler registration)
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(ScoreWdError::Cancelled);
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Flag shared with the orchestrator and the process adapter.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
