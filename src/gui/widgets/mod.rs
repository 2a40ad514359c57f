//! Reusable widget components for the egui frontend
//!
//! Widgets are self-contained UI elements used across multiple views.

pub mod edit_controls;
pub mod import_dialog;
pub mod prompt_detail;
pub mod response_box;
pub mod spinner;
pub mod toast;
