//! Detail dialog for a single saved prompt

use crate::gui::app::ConvoApp;
use crate::gui::views::history::{render_actions, render_tag_chips};

pub fn render_prompt_detail(ctx: &egui::Context, app: &mut ConvoApp) {
    let Some(id) = app.selected_prompt.clone() else {
        return;
    };
    let Some(record) = app.history.get(&id).cloned() else {
        // Deleted elsewhere
        app.selected_prompt = None;
        return;
    };

    let mut open = true;
    let mut action = None;

    egui::Window::new(record.title.as_str())
        .id(egui::Id::new("prompt_detail"))
        .collapsible(false)
        .resizable(true)
        .default_size([520.0, 420.0])
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            render_tag_chips(ui, &record.tags);
            ui.add_space(6.0);
            ui.separator();

            egui::ScrollArea::vertical()
                .max_height(300.0)
                .show(ui, |ui| {
                    ui.add(egui::Label::new(record.description.as_str()).wrap());
                });

            ui.add_space(8.0);
            action = render_actions(ui, &record.id);
        });

    if let Some(action) = action {
        app.handle_prompt_action(action);
    }
    if !open {
        app.selected_prompt = None;
    }
}
