//! "Import Chat" dialog for pasting a JSON chat transcript

use crate::gui::app::ConvoApp;

/// Render the import dialog when it is open
pub fn render_import_dialog(ctx: &egui::Context, app: &mut ConvoApp) {
    if !app.import_open {
        return;
    }

    let mut open = true;
    let mut submit = false;

    egui::Window::new("Import Chat")
        .collapsible(false)
        .resizable(true)
        .default_size([520.0, 360.0])
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label("Paste a chat");
            ui.add_space(6.0);

            egui::ScrollArea::vertical()
                .max_height(240.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut app.import_input)
                            .hint_text(r#"[{"role": "user", "content": "Hello!"}, ...]"#)
                            .code_editor()
                            .desired_rows(10)
                            .desired_width(f32::INFINITY),
                    );
                });

            if let Some(error) = &app.import_error {
                ui.add_space(4.0);
                ui.colored_label(egui::Color32::from_rgb(220, 20, 60), error);
            }

            ui.add_space(8.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Done").clicked() {
                    submit = true;
                }
            });
        });

    if submit {
        app.import_chat();
    } else if !open {
        app.close_import();
    }
}
