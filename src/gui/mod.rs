//! GUI module for the Convo egui frontend
//!
//! This module contains all UI components for the native desktop application.

pub mod app;
pub mod state;
pub mod views;
pub mod widgets;

pub use app::ConvoApp;
pub use state::{PromptAction, Toast, ToastType, View};
