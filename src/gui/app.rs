//! Main application state and eframe App implementation

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::backend::{BackendClient, Verdict};
use crate::canvas::{Canvas, Position};
use crate::classification::{self, ClassificationFlow, ClassifyAction};
use crate::config::AppConfig;
use crate::export;
use crate::generation::{self, GenerationEvent, GenerationFlow};
use crate::history::PromptHistory;
use crate::import;
use crate::selection::RubberBand;

use super::state::{PromptAction, Toast, View};
use super::views;
use super::widgets;

/// Canvas size assumed until the first frame has been laid out
const DEFAULT_PANEL_SIZE: egui::Vec2 = egui::vec2(900.0, 700.0);

type ClassifyOutcome = Result<Vec<Verdict>, String>;

/// Main application state holding all UI state and backend handles
pub struct ConvoApp {
    /// Active page (Canvas or History)
    pub current_view: View,

    /// Nodes and the selected subset
    pub canvas: Canvas,

    /// Rubber band being dragged, if any
    pub gesture: Option<RubberBand>,

    /// Last laid-out size of the canvas panel, used to place new nodes
    pub panel_size: egui::Vec2,

    /// Idea grid visibility
    pub grid_visible: bool,

    /// Edit controls expanded
    pub edit_menu_open: bool,

    /// "Import Chat" dialog state
    pub import_open: bool,
    pub import_input: String,
    pub import_error: Option<String>,

    /// Streaming prompt generation and the response draft
    pub generation: GenerationFlow,

    /// Classification badges and request state
    pub classification: ClassificationFlow,

    /// Saved prompts
    pub history: PromptHistory,

    /// Tag search text on the history page
    pub history_search: String,

    /// Prompt shown in the detail dialog
    pub selected_prompt: Option<String>,

    /// Active toast notifications
    pub toasts: Vec<Toast>,

    /// Counter for generating unique toast IDs
    pub next_toast_id: u64,

    backend: Arc<BackendClient>,

    /// Owns the worker threads; dropping the app shuts them down
    runtime: tokio::runtime::Runtime,

    egui_ctx: egui::Context,

    /// Events for the current generation run, tagged with its ticket
    generation_receiver: Option<(generation::Ticket, Receiver<GenerationEvent>)>,
    generation_cancel: Option<CancellationToken>,

    /// Result of the current classification request, tagged with its ticket
    classification_receiver: Option<(classification::Ticket, Receiver<ClassifyOutcome>)>,
    classification_cancel: Option<CancellationToken>,
}

impl ConvoApp {
    /// Create the app with its own tokio runtime and backend client
    pub fn new(cc: &eframe::CreationContext<'_>) -> crate::Result<Self> {
        let config = AppConfig::load();
        let backend = match BackendClient::from_config(&config) {
            Ok(backend) => backend,
            Err(e) => {
                log::error!("{}; falling back to default backend", e);
                BackendClient::from_config(&AppConfig::default())?
            }
        };
        log::info!(
            "Using generate endpoint {} and classify endpoint {}",
            backend.endpoints().generate,
            backend.endpoints().classify
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        Ok(Self::with_parts(cc.egui_ctx.clone(), runtime, backend))
    }

    fn with_parts(
        egui_ctx: egui::Context,
        runtime: tokio::runtime::Runtime,
        backend: BackendClient,
    ) -> Self {
        Self {
            current_view: View::Canvas,
            canvas: Canvas::new(),
            gesture: None,
            panel_size: DEFAULT_PANEL_SIZE,
            grid_visible: true,
            edit_menu_open: false,
            import_open: false,
            import_input: String::new(),
            import_error: None,
            generation: GenerationFlow::new(),
            classification: ClassificationFlow::new(),
            history: PromptHistory::seeded(),
            history_search: String::new(),
            selected_prompt: None,
            toasts: Vec::new(),
            next_toast_id: 0,
            backend: Arc::new(backend),
            runtime,
            egui_ctx,
            generation_receiver: None,
            generation_cancel: None,
            classification_receiver: None,
            classification_cancel: None,
        }
    }

    /// Add a toast notification
    pub fn add_toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    /// Remove expired toasts
    pub fn cleanup_toasts(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    /// Get next unique toast ID
    pub fn next_toast_id(&mut self) -> u64 {
        let id = self.next_toast_id;
        self.next_toast_id += 1;
        id
    }

    fn toast_error(&mut self, message: impl Into<String>) {
        let id = self.next_toast_id();
        self.add_toast(Toast::error(id, message));
    }

    fn toast_success(&mut self, message: impl Into<String>) {
        let id = self.next_toast_id();
        self.add_toast(Toast::success(id, message));
    }

    /// Either network flow is waiting on the backend
    pub fn is_busy(&self) -> bool {
        self.generation.is_busy() || self.classification.is_busy()
    }

    pub fn open_import(&mut self) {
        self.import_open = true;
        self.import_error = None;
    }

    pub fn close_import(&mut self) {
        self.import_open = false;
        self.import_error = None;
    }

    /// Replace the canvas with the user turns from the pasted chat
    pub fn import_chat(&mut self) {
        match import::parse_user_messages(&self.import_input) {
            Ok(contents) => {
                let mut rng = rand::thread_rng();
                self.canvas.import_batch(
                    contents,
                    self.panel_size.x,
                    self.panel_size.y,
                    &mut rng,
                );
                self.cancel_classification();
                self.classification.reset();
                self.gesture = None;
                self.import_input.clear();
                self.close_import();
            }
            Err(e) => {
                log::warn!("Chat import rejected: {}", e);
                self.import_error = Some(e.to_string());
            }
        }
    }

    /// Add a single node from the idea grid
    pub fn add_idea(&mut self, content: &str) {
        let mut rng = rand::thread_rng();
        self.canvas
            .add_node(content, self.panel_size.x, self.panel_size.y, &mut rng);
    }

    /// Pointer went down on the canvas at a panel-local position. A press on
    /// empty canvas clears the selection and starts a rubber band; presses on
    /// markers, the header or the instructions leave both alone.
    pub fn begin_selection(&mut self, start: Position) {
        let target = views::canvas::press_target(start, self.panel_size, self.canvas.nodes());
        if let Some(gesture) = RubberBand::begin(target, start) {
            self.canvas.clear_selection();
            self.gesture = Some(gesture);
        }
    }

    /// Pointer moved while a rubber band is active
    pub fn update_selection(&mut self, current: Position) {
        if let Some(gesture) = self.gesture.as_mut() {
            gesture.update(current);
        }
    }

    /// Pointer released (anywhere): replace the selection with what the band covers
    pub fn finish_selection(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            let selection = gesture.finish(self.canvas.nodes());
            log::debug!("Rubber band selected {} nodes", selection.len());
            self.canvas.set_selection(selection);
        }
    }

    /// "Reset Flow": drop all nodes, the selection and any classification work
    pub fn reset_flow(&mut self) {
        self.canvas.reset();
        self.gesture = None;
        self.cancel_classification();
        self.classification.reset();
        log::info!("Canvas reset");
    }

    /// "Create Ideas": stream a generated prompt for the selected nodes
    pub fn trigger_generation(&mut self) {
        let contents = self.canvas.selected_contents();
        let ticket = match self.generation.start(&contents) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.toast_error(e.to_string());
                return;
            }
        };

        self.cancel_generation();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let (tx, rx) = std::sync::mpsc::channel();
        let backend = self.backend.clone();
        let ctx = self.egui_ctx.clone();

        self.runtime.spawn(async move {
            let opened = tokio::select! {
                _ = task_cancel.cancelled() => return,
                opened = backend.open_generation_stream(&contents) => opened,
            };

            match opened {
                Ok(body) => {
                    generation::pump_stream(body, &tx, &task_cancel, || ctx.request_repaint())
                        .await;
                }
                Err(e) => {
                    log::error!("No readable stream returned: {}", e);
                    let _ = tx.send(GenerationEvent::Failed(e.to_string()));
                    ctx.request_repaint();
                }
            }
        });

        self.generation_receiver = Some((ticket, rx));
        self.generation_cancel = Some(cancel);
    }

    fn cancel_generation(&mut self) {
        if let Some(cancel) = self.generation_cancel.take() {
            cancel.cancel();
        }
        self.generation_receiver = None;
    }

    /// Drain streamed events for the current run
    fn check_generation_events(&mut self) {
        let Some((ticket, rx)) = self.generation_receiver.as_ref() else {
            return;
        };
        let ticket = *ticket;

        // Collect first to release the borrow on the receiver
        let mut events = Vec::new();
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        for event in events {
            self.generation.apply(ticket, event);
        }

        if disconnected {
            if self.generation.current_ticket() == ticket && self.generation.is_active() {
                self.generation.abandon();
            }
            self.generation_receiver = None;
            self.generation_cancel = None;
        }
    }

    /// Close the response dialog, discarding the draft and any running stream
    pub fn close_response(&mut self) {
        self.cancel_generation();
        self.generation.close();
    }

    /// Save the response draft to history
    pub fn save_response(&mut self) {
        match self.generation.save() {
            Ok(record) => {
                self.cancel_generation();
                let title = record.title.clone();
                self.history.prepend(record);
                self.toast_success(format!("Saved \"{}\"", title));
            }
            Err(e) => {
                log::debug!("Draft not saved: {}", e);
            }
        }
    }

    /// Classify button: hide, re-show, or ask the backend
    pub fn trigger_classification(&mut self) {
        let items = match self.classification.toggle(self.canvas.nodes()) {
            ClassifyAction::Hide | ClassifyAction::Show => return,
            ClassifyAction::Request(items) => items,
        };

        self.cancel_classification();
        let ticket = self.classification.begin_request();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let (tx, rx) = std::sync::mpsc::channel();
        let backend = self.backend.clone();
        let ctx = self.egui_ctx.clone();

        self.runtime.spawn(async move {
            let result = tokio::select! {
                _ = task_cancel.cancelled() => return,
                result = backend.classify(&items) => result,
            };
            let _ = tx.send(result.map_err(|e| e.to_string()));
            ctx.request_repaint();
        });

        self.classification_receiver = Some((ticket, rx));
        self.classification_cancel = Some(cancel);
    }

    fn cancel_classification(&mut self) {
        if let Some(cancel) = self.classification_cancel.take() {
            cancel.cancel();
        }
        self.classification_receiver = None;
    }

    /// Check if classification results have arrived
    fn check_classification_result(&mut self) {
        let Some((ticket, rx)) = self.classification_receiver.as_ref() else {
            return;
        };
        let ticket = *ticket;

        match rx.try_recv() {
            Ok(result) => {
                self.classification
                    .complete(ticket, result, self.canvas.nodes_mut());
                self.classification_receiver = None;
                self.classification_cancel = None;
            }
            Err(TryRecvError::Empty) => {
                // Still waiting
            }
            Err(TryRecvError::Disconnected) => {
                self.classification
                    .complete(ticket, Err("request abandoned".to_string()), self.canvas.nodes_mut());
                self.classification_receiver = None;
                self.classification_cancel = None;
            }
        }
    }

    /// Run a card or detail-dialog action
    pub fn handle_prompt_action(&mut self, action: PromptAction) {
        match action {
            PromptAction::Open(id) => {
                self.selected_prompt = Some(id);
            }
            PromptAction::Copy(id) => {
                if let Some(record) = self.history.get(&id) {
                    let text = record.description.clone();
                    self.egui_ctx.output_mut(|o| o.copied_text = text);
                    self.toast_success("Copied to clipboard");
                }
            }
            PromptAction::Download(id) => {
                let Some(record) = self.history.get(&id) else {
                    return;
                };
                match export::export_prompt(&export::download_dir(), record) {
                    Ok(path) => self.toast_success(format!("Saved to {}", path.display())),
                    Err(e) => {
                        log::error!("Failed to download file: {}", e);
                        self.toast_error(format!("Download failed: {}", e));
                    }
                }
            }
            PromptAction::Delete(id) => {
                if self.selected_prompt.as_deref() == Some(id.as_str()) {
                    self.selected_prompt = None;
                }
                self.history.delete(&id);
            }
        }
    }

    /// Escape closes the topmost dialog
    fn handle_escape(&mut self) {
        if self.selected_prompt.is_some() {
            self.selected_prompt = None;
        } else if self.import_open {
            self.close_import();
        } else if self.generation.draft().is_some() {
            self.close_response();
        } else if self.current_view == View::History {
            self.current_view = View::Canvas;
        }
    }
}

impl Drop for ConvoApp {
    fn drop(&mut self) {
        self.cancel_generation();
        self.cancel_classification();
    }
}

impl eframe::App for ConvoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for async updates
        self.check_generation_events();
        self.check_classification_result();
        self.cleanup_toasts();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.handle_escape();
        }

        match self.current_view {
            View::Canvas => views::canvas::render_canvas_view(ctx, self),
            View::History => views::history::render_history_view(ctx, self),
        }

        widgets::response_box::render_response_box(ctx, self);

        if self.is_busy() {
            widgets::spinner::render_busy_overlay(ctx);
        }

        widgets::toast::render_toasts(ctx, &self.toasts);

        // Toasts expire on their own; keep frames coming while any are shown
        if !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
