//! Loading indicator shown while a backend request is pending

/// Centered spinner drawn above everything else
pub fn render_busy_overlay(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("busy_overlay"))
        .order(egui::Order::Foreground)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Waiting for backend...");
                });
            });
        });
}
