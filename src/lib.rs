pub mod backend;
pub mod canvas;
pub mod classification;
pub mod config;
pub mod export;
pub mod generation;
pub mod gui;
pub mod history;
pub mod import;
pub mod selection;

use std::error::Error;

pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;
