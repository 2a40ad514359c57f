//! Floating edit controls in the bottom-right corner of the canvas

use crate::gui::app::ConvoApp;

pub fn render_edit_controls(ctx: &egui::Context, app: &mut ConvoApp) {
    egui::Area::new(egui::Id::new("edit_controls"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -40.0])
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                if app.edit_menu_open {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        let classify_label = if app.classification.is_visible() {
                            "Hide Classification"
                        } else {
                            "Classify Ideas"
                        };
                        let classify = ui.add_enabled(
                            !app.classification.is_busy(),
                            egui::SelectableLabel::new(app.classification.is_visible(), classify_label),
                        );
                        if classify.clicked() {
                            app.trigger_classification();
                        }

                        let grid_label = if app.grid_visible { "Hide Grid" } else { "Show Grid" };
                        if ui.selectable_label(app.grid_visible, grid_label).clicked() {
                            app.grid_visible = !app.grid_visible;
                        }
                    });
                    ui.add_space(6.0);
                }

                let fab = egui::Button::new(egui::RichText::new("✏").size(20.0))
                    .rounding(24.0)
                    .min_size(egui::vec2(48.0, 48.0));
                if ui.add(fab).on_hover_text("Edit").clicked() {
                    app.edit_menu_open = !app.edit_menu_open;
                }
            });
        });
}
