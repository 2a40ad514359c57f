// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Convo desktop application
//!
//! A native canvas for arranging chat turns and prompt fragments, built on
//! egui/eframe. Prompt generation and classification run on an external
//! backend.

use convo_canvas::gui::ConvoApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "convo_canvas=info,eframe=warn,egui=warn,reqwest=warn";

fn main() -> eframe::Result<()> {
    init_logging();
    log::info!("Starting Convo");

    let viewport_builder = egui::ViewportBuilder::default()
        .with_title("Convo")
        .with_inner_size([1280.0, 800.0])
        .with_min_inner_size([900.0, 600.0]);

    let options = eframe::NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    eframe::run_native(
        "Convo",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ConvoApp::new(cc)?))
        }),
    )
}

/// `RUST_LOG` wins over the built-in filter; `log` records are bridged into
/// the subscriber.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
