//! View components for the egui frontend
//!
//! Each view module contains render functions for a specific screen.

pub mod canvas;
pub mod history;
