//! History view listing saved prompts with tag search

use egui::{Color32, Ui};

use crate::gui::app::ConvoApp;
use crate::gui::state::{PromptAction, View};
use crate::gui::widgets;
use crate::history::PromptRecord;

const CARD_WIDTH: f32 = 300.0;

/// Render the saved-prompt page
pub fn render_history_view(ctx: &egui::Context, app: &mut ConvoApp) {
    egui::TopBottomPanel::top("history_header").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.heading("Convo");
            ui.add_space(16.0);
            if ui.button("⬅ Back").clicked() {
                app.current_view = View::Canvas;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut app.history_search)
                        .hint_text("Search by tags (e.g., python fastapi)")
                        .desired_width(280.0),
                );
                ui.label("🔍");
            });
        });
        ui.add_space(8.0);
    });

    let mut action: Option<PromptAction> = None;

    egui::CentralPanel::default().show(ctx, |ui| {
        let matches = app.history.search(&app.history_search);

        ui.horizontal(|ui| {
            ui.heading("Prompt Log");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(format!("{} of {} prompts", matches.len(), app.history.len()));
            });
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        if matches.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(50.0);
                if app.history.is_empty() {
                    ui.label("No saved prompts yet");
                    ui.add_space(10.0);
                    ui.weak("Select nodes on the canvas and use Create Ideas to generate one.");
                } else {
                    ui.label("No prompts match those tags");
                }
            });
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for record in &matches {
                        ui.push_id(record.id.as_str(), |ui| {
                            if let Some(picked) = render_card(ui, record) {
                                action = Some(picked);
                            }
                        });
                    }
                });
            });
    });

    // Handle actions outside the panel closure to avoid borrow issues
    if let Some(action) = action {
        app.handle_prompt_action(action);
    }

    widgets::prompt_detail::render_prompt_detail(ctx, app);
}

fn render_card(ui: &mut Ui, record: &PromptRecord) -> Option<PromptAction> {
    let mut action = None;

    egui::Frame::none()
        .fill(if ui.visuals().dark_mode {
            Color32::from_gray(30)
        } else {
            Color32::from_gray(245)
        })
        .rounding(4.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(CARD_WIDTH);

            let title = ui.add(
                egui::Label::new(egui::RichText::new(&record.title).strong())
                    .sense(egui::Sense::click()),
            );
            if title.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if title.clicked() {
                action = Some(PromptAction::Open(record.id.clone()));
            }

            ui.add_space(4.0);
            ui.label(create_snippet(&record.description, 140));
            ui.add_space(4.0);
            render_tag_chips(ui, &record.tags);
            ui.add_space(6.0);

            if let Some(picked) = render_actions(ui, &record.id) {
                action = Some(picked);
            }
        });

    action
}

/// `#tag` chips in a wrapped row
pub fn render_tag_chips(ui: &mut Ui, tags: &[String]) {
    ui.horizontal_wrapped(|ui| {
        for tag in tags {
            ui.label(
                egui::RichText::new(format!("#{}", tag))
                    .small()
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        }
    });
}

/// Download, copy and delete buttons shared by cards and the detail dialog
pub fn render_actions(ui: &mut Ui, id: &str) -> Option<PromptAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.small_button("⬇ Download").clicked() {
            action = Some(PromptAction::Download(id.to_string()));
        }
        if ui.small_button("📋 Copy").clicked() {
            action = Some(PromptAction::Copy(id.to_string()));
        }
        if ui.small_button("🗑 Delete").clicked() {
            action = Some(PromptAction::Delete(id.to_string()));
        }
    });
    action
}

/// Truncate a description for a card, breaking at whitespace
fn create_snippet(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }

    let truncated: String = content.chars().take(max_chars).collect();
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}
