use std::process::Command;
use std::sync::Mutex;

use crate::error::StandupError;

/// Delivery seam for desktop notifications. The daemon builds the text;
/// how it reaches the screen is this trait's problem.
pub trait Notifier: Send + Sync {
    fn notify(&self, summary: &str, body: &str) -> Result<(), StandupError>;
}

/// Sends through the freedesktop `notify-send` tool.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), StandupError> {
        let status = Command::new("notify-send")
            .arg(summary)
            .arg(body)
            .status()
            .map_err(|e| StandupError::NotifyError(format!("notify-send: {}", e)))?;
        if !status.success() {
            return Err(StandupError::NotifyError(format!(
                "notify-send exited with {}",
                status
            )));
        }
        Ok(())
    }
}

/// Captures notifications instead of sending them; for tests.
#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl Notifier for FakeNotifier {
    fn notify(&self, summary: &str, body: &str) -> Result<(), StandupError> {
        self.sent
            .lock()
            .map_err(|_| StandupError::NotifyError("notification log poisoned".to_string()))?
            .push((summary.to_string(), body.to_string()));
        Ok(())
    }
}
