//! Toast notification widget

use crate::gui::state::{Toast, ToastType};
use egui::{Color32, Context};

/// Render toast notifications above the edit controls in the bottom-right corner
///
/// Shows up to 4 toasts, newest on top.
pub fn render_toasts(ctx: &Context, toasts: &[Toast]) {
    if toasts.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("toast_area"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -96.0])
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                for toast in toasts.iter().rev().take(4) {
                    egui::Frame::none()
                        .fill(toast_color(toast.toast_type))
                        .rounding(4.0)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.colored_label(Color32::WHITE, &toast.message);
                        });
                    ui.add_space(4.0);
                }
            });
        });
}

fn toast_color(toast_type: ToastType) -> Color32 {
    match toast_type {
        ToastType::Success => Color32::from_rgb(60, 179, 113), // Medium sea green
        ToastType::Error => Color32::from_rgb(220, 20, 60),    // Crimson
    }
}
