//! "Generated Prompt" dialog showing the streamed response draft

use crate::generation::GenerationStatus;
use crate::gui::app::ConvoApp;

/// Render the response dialog while a draft exists
pub fn render_response_box(ctx: &egui::Context, app: &mut ConvoApp) {
    let streaming = *app.generation.status() == GenerationStatus::Streaming;
    let Some(draft) = app.generation.draft_mut() else {
        return;
    };

    let mut open = true;
    let mut save = false;

    egui::Window::new("Generated Prompt")
        .collapsible(false)
        .resizable(true)
        .default_size([560.0, 480.0])
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            if streaming {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.weak("Receiving...");
                });
            }

            egui::ScrollArea::vertical()
                .max_height(300.0)
                .stick_to_bottom(streaming)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut draft.text)
                            .hint_text("No optimized prompt returned from backend.")
                            .desired_rows(12)
                            .desired_width(f32::INFINITY),
                    );
                });

            ui.add_space(8.0);
            ui.add(
                egui::TextEdit::singleline(&mut draft.title)
                    .hint_text("Enter a title for your prompt")
                    .desired_width(f32::INFINITY),
            );
            ui.add(
                egui::TextEdit::singleline(&mut draft.tags)
                    .hint_text("Add tags (e.g., python api)")
                    .desired_width(f32::INFINITY),
            );

            if let Some(error) = &draft.error {
                ui.colored_label(egui::Color32::from_rgb(220, 20, 60), error);
            }

            ui.add_space(8.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save Prompt").clicked() {
                    save = true;
                }
            });
        });

    if save {
        app.save_response();
    } else if !open {
        app.close_response();
    }
}
