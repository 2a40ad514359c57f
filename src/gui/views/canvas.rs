//! Canvas view: side panel with actions and the idea grid, plus the node canvas

use egui::{Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use crate::canvas::{Classification, Node, Position, IDEA_FRAGMENTS, MARKER_WIDTH};
use crate::gui::app::ConvoApp;
use crate::gui::widgets;
use crate::selection::PressTarget;

/// Height of the strip at the top of the canvas showing the selection count
pub const HEADER_HEIGHT: f32 = 36.0;

/// Height of the instruction strip along the bottom of the canvas
pub const INSTRUCTIONS_HEIGHT: f32 = 28.0;

const INSTRUCTIONS: &str =
    "Drag on empty space to select nodes • drag a node to move the selection • Create Ideas turns the selection into a prompt";

/// Render the canvas page and its dialogs
pub fn render_canvas_view(ctx: &egui::Context, app: &mut ConvoApp) {
    egui::SidePanel::left("actions_panel")
        .resizable(false)
        .exact_width(260.0)
        .show(ctx, |ui| {
            render_side_panel(ui, app);
        });

    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(ctx.style().visuals.extreme_bg_color))
        .show(ctx, |ui| {
            render_canvas(ui, app);
        });

    widgets::import_dialog::render_import_dialog(ctx, app);
    widgets::edit_controls::render_edit_controls(ctx, app);
}

fn render_side_panel(ui: &mut Ui, app: &mut ConvoApp) {
    ui.add_space(12.0);
    ui.heading("Convo");
    ui.weak("canvas for computer chat");
    ui.add_space(12.0);

    let busy = app.is_busy();
    let has_nodes = !app.canvas.is_empty();

    ui.vertical_centered_justified(|ui| {
        if ui.button("Add Chat").clicked() {
            app.open_import();
        }
        if has_nodes {
            if ui.button("Reset Flow").clicked() {
                app.reset_flow();
            }
            if ui
                .add_enabled(!busy, egui::Button::new("Create Ideas"))
                .clicked()
            {
                app.trigger_generation();
            }
        }
        if ui.button("View Log").clicked() {
            app.current_view = crate::gui::state::View::History;
        }
    });

    if !app.grid_visible {
        return;
    }

    ui.add_space(16.0);
    ui.separator();
    ui.strong("Idea grid");
    ui.add_space(4.0);

    let mut picked: Option<&str> = None;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for fragment in IDEA_FRAGMENTS {
                    if ui.small_button(fragment).clicked() {
                        picked = Some(fragment);
                    }
                }
            });
        });

    if let Some(fragment) = picked {
        app.add_idea(fragment);
    }
}

/// Which part of the canvas a panel-local press landed on
pub fn press_target(local: Position, panel_size: Vec2, nodes: &[Node]) -> PressTarget {
    if local.y < HEADER_HEIGHT {
        return PressTarget::Header;
    }
    if local.y > panel_size.y - INSTRUCTIONS_HEIGHT {
        return PressTarget::Instructions;
    }
    let on_marker = nodes.iter().any(|node| {
        local.x >= node.position.x
            && local.x <= node.position.x + MARKER_WIDTH
            && local.y >= node.position.y
            && local.y <= node.position.y + MARKER_WIDTH
    });
    if on_marker {
        PressTarget::Marker
    } else {
        PressTarget::Canvas
    }
}

fn to_local(pos: Pos2, origin: Pos2) -> Position {
    Position::new(pos.x - origin.x, pos.y - origin.y)
}

fn render_canvas(ui: &mut Ui, app: &mut ConvoApp) {
    let (background, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let panel = background.rect;
    let origin = panel.min;
    app.panel_size = panel.size();

    // Nodes are interacted after the background so they sit on top for hit-testing
    let mut drag_start: Option<String> = None;
    let mut drags: Vec<(String, Vec2)> = Vec::new();

    for node in app.canvas.nodes() {
        let rect = Rect::from_min_size(
            origin + Vec2::new(node.position.x, node.position.y),
            Vec2::splat(MARKER_WIDTH),
        );
        let response = ui
            .interact(rect, egui::Id::new(("node", node.id.as_str())), Sense::click_and_drag())
            .on_hover_text(node.content.as_str());

        if response.drag_started() || response.clicked() {
            drag_start = Some(node.id.clone());
        }
        if response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                drags.push((node.id.clone(), delta));
            }
        }
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }
    }

    if let Some(id) = drag_start {
        app.canvas.begin_node_drag(&id);
    }
    for (id, delta) in drags {
        app.canvas.drag_by(&id, delta.x, delta.y);
    }

    handle_rubber_band(ui, app, &background, origin);

    paint_nodes(&painter, app, origin);
    paint_header(&painter, app, panel);
    paint_instructions(&painter, panel);

    if let Some(gesture) = &app.gesture {
        let rect = gesture.rect();
        let screen = Rect::from_min_size(
            origin + Vec2::new(rect.x, rect.y),
            Vec2::new(rect.width, rect.height),
        );
        let accent = ui.visuals().selection.bg_fill;
        painter.rect_filled(screen, 0.0, accent.gamma_multiply(0.15));
        painter.rect_stroke(screen, 0.0, Stroke::new(1.0, accent));
    }
}

fn handle_rubber_band(ui: &Ui, app: &mut ConvoApp, background: &egui::Response, origin: Pos2) {
    let (pressed, press_origin, latest, any_down) = ui.input(|i| {
        (
            i.pointer.any_pressed(),
            i.pointer.press_origin(),
            i.pointer.latest_pos(),
            i.pointer.any_down(),
        )
    });

    // Starts on pointer-down, before egui's drag threshold is crossed
    if pressed && background.contains_pointer() {
        if let Some(pos) = press_origin {
            app.begin_selection(to_local(pos, origin));
        }
    }

    // Keeps tracking once the pointer leaves the panel
    if let Some(pos) = latest {
        app.update_selection(to_local(pos, origin));
    }

    // A release anywhere ends the gesture; a click without movement selects nothing
    if !any_down {
        app.finish_selection();
    }
}

fn paint_nodes(painter: &egui::Painter, app: &ConvoApp, origin: Pos2) {
    let style = painter.ctx().style();
    let visuals = &style.visuals;
    let fill = visuals.widgets.inactive.bg_fill;
    let text_color = visuals.text_color();
    let accent = visuals.selection.bg_fill;
    let show_badges = app.classification.is_visible();

    for node in app.canvas.nodes() {
        let rect = Rect::from_min_size(
            origin + Vec2::new(node.position.x, node.position.y),
            Vec2::splat(MARKER_WIDTH),
        );

        painter.rect_filled(rect, 6.0, fill);
        let stroke = if app.canvas.is_selected(&node.id) {
            Stroke::new(2.5, accent)
        } else {
            Stroke::new(1.0, Color32::from_gray(90))
        };
        painter.rect_stroke(rect, 6.0, stroke);

        let inner = rect.shrink(6.0);
        let galley = painter.layout(
            node.content.clone(),
            FontId::proportional(10.0),
            text_color,
            inner.width(),
        );
        painter
            .with_clip_rect(inner)
            .galley(inner.min + Vec2::new(0.0, 10.0), galley, text_color);

        if let Some(order) = node.order {
            painter.text(
                inner.min,
                egui::Align2::LEFT_TOP,
                format!("#{}", order),
                FontId::monospace(9.0),
                Color32::from_gray(150),
            );
        }

        if show_badges && node.classification == Some(Classification::Unique) {
            painter.text(
                rect.right_top() + Vec2::new(-2.0, 2.0),
                egui::Align2::RIGHT_TOP,
                "📌",
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
    }
}

fn paint_header(painter: &egui::Painter, app: &ConvoApp, panel: Rect) {
    let strip = Rect::from_min_size(panel.min, Vec2::new(panel.width(), HEADER_HEIGHT));
    painter.rect_filled(strip, 0.0, Color32::from_black_alpha(90));

    let selected = app.canvas.selection().len();
    let label = match (app.canvas.nodes().len(), selected) {
        (0, _) => "Add a chat or pick ideas from the grid".to_string(),
        (total, 0) => format!("{} nodes", total),
        (total, n) => format!("{} of {} nodes selected", n, total),
    };
    painter.text(
        strip.left_center() + Vec2::new(12.0, 0.0),
        egui::Align2::LEFT_CENTER,
        label,
        FontId::proportional(14.0),
        Color32::from_gray(200),
    );
}

fn paint_instructions(painter: &egui::Painter, panel: Rect) {
    let strip = Rect::from_min_max(
        Pos2::new(panel.left(), panel.bottom() - INSTRUCTIONS_HEIGHT),
        panel.max,
    );
    painter.rect_filled(strip, 0.0, Color32::from_black_alpha(90));
    painter.text(
        strip.center(),
        egui::Align2::CENTER_CENTER,
        INSTRUCTIONS,
        FontId::proportional(12.0),
        Color32::from_gray(160),
    );
}
