//! Application state types for the egui frontend

use std::time::{Duration, Instant};

/// Which page fills the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Node canvas with the idea grid
    #[default]
    Canvas,
    /// Saved prompt history
    History,
}

/// Toast visual style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    /// Confirmation of a user action (green)
    Success,
    /// Validation problem or failed action (red)
    Error,
}

/// Short-lived notification in the corner of the window
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub toast_type: ToastType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(
        id: u64,
        message: impl Into<String>,
        toast_type: ToastType,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Copy/download confirmations only need a moment
    pub fn success(id: u64, message: impl Into<String>) -> Self {
        Self::new(id, message, ToastType::Success, Duration::from_secs(2))
    }

    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self::new(id, message, ToastType::Error, Duration::from_secs(6))
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Action picked on a prompt card or in the detail dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    Open(String),
    Copy(String),
    Download(String),
    Delete(String),
}
