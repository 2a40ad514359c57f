//! Streaming prompt generation
//!
//! A background task reads the response body chunk by chunk and reports
//! [`GenerationEvent`]s over a channel. The UI thread owns a
//! [`GenerationFlow`] and applies those events to the response draft once per
//! frame.

use std::sync::mpsc::Sender;

use futures_util::{Stream, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::history::{parse_tag_input, PromptRecord};

/// Identifies one generation run; events from older runs are dropped
pub type Ticket = u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Please select at least one node first.")]
    EmptySelection,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("A title is required to save the prompt.")]
    MissingTitle,
    #[error("There is no generated prompt to save.")]
    NoDraft,
}

/// Progress reported by the streaming task
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// The body started arriving; open the display with an empty accumulator
    Opened,
    /// Decoded text to append
    Chunk(String),
    /// Body fully read
    Finished,
    /// Request or read failure
    Failed(String),
}

/// Incremental UTF-8 decoder.
///
/// Multi-byte sequences split across chunk boundaries are held back until the
/// rest arrives. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();
        let mut consumed = 0;

        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_up_to = consumed + e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_up_to]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_up_to + bad;
                        }
                        None => {
                            // Truncated sequence at the end; wait for more bytes
                            consumed = valid_up_to;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        out
    }

    /// Flush whatever is left when the stream ends
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Read `body` to the end, sending an event per decoded chunk.
///
/// `notify` runs after each event so the UI can repaint. Returns early without
/// further events when `cancel` fires or the receiver is gone.
pub async fn pump_stream<S, B, E>(
    body: S,
    tx: &Sender<GenerationEvent>,
    cancel: &CancellationToken,
    notify: impl Fn(),
) where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let send = |event: GenerationEvent| {
        let delivered = tx.send(event).is_ok();
        notify();
        delivered
    };

    if !send(GenerationEvent::Opened) {
        return;
    }

    let mut decoder = Utf8StreamDecoder::new();
    futures_util::pin_mut!(body);

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                log::info!("Generation stream cancelled");
                return;
            }
            next = body.next() => next,
        };

        match next {
            Some(Ok(bytes)) => {
                let text = decoder.decode(bytes.as_ref());
                log::debug!("Received {} bytes of generated text", bytes.as_ref().len());
                if !text.is_empty() && !send(GenerationEvent::Chunk(text)) {
                    return;
                }
            }
            Some(Err(e)) => {
                log::error!("Streaming failed: {}", e);
                let rest = decoder.finish();
                if !rest.is_empty() {
                    send(GenerationEvent::Chunk(rest));
                }
                send(GenerationEvent::Failed(e.to_string()));
                return;
            }
            None => break,
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() && !send(GenerationEvent::Chunk(rest)) {
        return;
    }
    send(GenerationEvent::Finished);
}

/// Where a generation run currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    /// Waiting for the first byte
    Requesting,
    /// Body arriving; not busy, the display shows progress itself
    Streaming,
}

/// Editable response shown in the "Generated Prompt" dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDraft {
    pub text: String,
    pub title: String,
    pub tags: String,
    pub error: Option<String>,
}

impl ResponseDraft {
    /// Validate the form and turn it into a history record
    pub fn to_record(&self) -> Result<PromptRecord, DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        Ok(PromptRecord::new(
            self.title.clone(),
            self.text.clone(),
            parse_tag_input(&self.tags),
        ))
    }
}

/// UI-side state of the generation flow
#[derive(Debug, Default)]
pub struct GenerationFlow {
    status: GenerationStatus,
    ticket: Ticket,
    /// `Some` while the response dialog is open
    draft: Option<ResponseDraft>,
}

impl GenerationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status == GenerationStatus::Requesting
    }

    pub fn is_active(&self) -> bool {
        self.status != GenerationStatus::Idle
    }

    pub fn draft(&self) -> Option<&ResponseDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ResponseDraft> {
        self.draft.as_mut()
    }

    /// Validate the selection and start a new run; returns its ticket.
    /// A draft left open from an earlier run is discarded.
    pub fn start(&mut self, selected_contents: &[String]) -> Result<Ticket, GenerateError> {
        if selected_contents.is_empty() {
            return Err(GenerateError::EmptySelection);
        }
        self.draft = None;
        self.ticket += 1;
        self.status = GenerationStatus::Requesting;
        Ok(self.ticket)
    }

    pub fn current_ticket(&self) -> Ticket {
        self.ticket
    }

    /// Apply an event from the streaming task. Returns false for stale tickets.
    pub fn apply(&mut self, ticket: Ticket, event: GenerationEvent) -> bool {
        if ticket != self.ticket || self.status == GenerationStatus::Idle {
            return false;
        }

        match event {
            GenerationEvent::Opened => {
                self.status = GenerationStatus::Streaming;
                self.draft = Some(ResponseDraft::default());
            }
            GenerationEvent::Chunk(text) => {
                // Appends onto whatever the user left in the box
                if let Some(draft) = self.draft.as_mut() {
                    draft.text.push_str(&text);
                }
            }
            GenerationEvent::Finished => {
                self.status = GenerationStatus::Idle;
            }
            GenerationEvent::Failed(message) => {
                log::error!("Prompt generation failed: {}", message);
                self.status = GenerationStatus::Idle;
            }
        }
        true
    }

    /// The task ended without a final event (channel dropped)
    pub fn abandon(&mut self) {
        self.status = GenerationStatus::Idle;
    }

    /// Close the dialog and forget the draft; any running stream becomes stale
    pub fn close(&mut self) {
        self.draft = None;
        self.status = GenerationStatus::Idle;
        self.ticket += 1;
    }

    /// Validate the draft and close the dialog on success
    pub fn save(&mut self) -> Result<PromptRecord, DraftError> {
        let draft = match self.draft.as_mut() {
            Some(draft) => draft,
            None => return Err(DraftError::NoDraft),
        };

        match draft.to_record() {
            Ok(record) => {
                self.close();
                Ok(record)
            }
            Err(e) => {
                draft.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::sync::mpsc;

    fn ok_chunks(chunks: &[&'static [u8]]) -> impl Stream<Item = Result<&'static [u8], String>> {
        stream::iter(chunks.iter().copied().map(Ok).collect::<Vec<_>>())
    }

    async fn collect_events<S, B, E>(body: S) -> Vec<GenerationEvent>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        pump_stream(body, &tx, &cancel, || {}).await;
        drop(tx);
        rx.iter().collect()
    }

    #[tokio::test]
    async fn test_accumulator_grows_chunk_by_chunk() {
        let events = collect_events(ok_chunks(&[b"Hel", b"lo"])).await;

        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        assert!(flow.is_busy());
        assert!(flow.draft().is_none());

        let mut snapshots = Vec::new();
        for event in events {
            flow.apply(ticket, event);
            if let Some(draft) = flow.draft() {
                if snapshots.last() != Some(&draft.text) {
                    snapshots.push(draft.text.clone());
                }
            }
        }

        assert_eq!(snapshots, vec!["".to_string(), "Hel".to_string(), "Hello".to_string()]);
        assert_eq!(flow.status(), &GenerationStatus::Idle);
    }

    #[tokio::test]
    async fn test_opening_clears_busy_before_first_chunk() {
        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        flow.apply(ticket, GenerationEvent::Opened);
        assert!(!flow.is_busy());
        assert_eq!(flow.status(), &GenerationStatus::Streaming);
        assert_eq!(flow.draft().unwrap().text, "");
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let mut flow = GenerationFlow::new();
        assert_eq!(flow.start(&[]), Err(GenerateError::EmptySelection));
        assert!(!flow.is_busy());
        assert_eq!(
            GenerateError::EmptySelection.to_string(),
            "Please select at least one node first."
        );
    }

    #[test]
    fn test_failure_before_open_leaves_display_closed() {
        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        flow.apply(ticket, GenerationEvent::Failed("connection refused".to_string()));
        assert!(!flow.is_busy());
        assert!(flow.draft().is_none());
    }

    #[tokio::test]
    async fn test_read_failure_keeps_partial_text() {
        let body = stream::iter(vec![
            Ok::<&[u8], String>(b"partial "),
            Err("connection reset".to_string()),
        ]);
        let events = collect_events(body).await;
        assert_eq!(events.last(), Some(&GenerationEvent::Failed("connection reset".to_string())));

        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        for event in events {
            flow.apply(ticket, event);
        }
        assert!(!flow.is_active());
        assert_eq!(flow.draft().unwrap().text, "partial ");
    }

    #[test]
    fn test_user_edits_mid_stream_are_appended_to() {
        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        flow.apply(ticket, GenerationEvent::Opened);
        flow.apply(ticket, GenerationEvent::Chunk("Hello".to_string()));

        flow.draft_mut().unwrap().text = "Howdy".to_string();
        flow.apply(ticket, GenerationEvent::Chunk(" world".to_string()));

        assert_eq!(flow.draft().unwrap().text, "Howdy world");
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut flow = GenerationFlow::new();
        let old = flow.start(&["a".to_string()]).unwrap();
        flow.apply(old, GenerationEvent::Opened);
        flow.close();

        let new = flow.start(&["b".to_string()]).unwrap();
        assert!(!flow.apply(old, GenerationEvent::Chunk("late".to_string())));
        assert!(flow.apply(new, GenerationEvent::Opened));
        assert_eq!(flow.draft().unwrap().text, "");
    }

    #[test]
    fn test_events_after_close_are_dropped() {
        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        flow.apply(ticket, GenerationEvent::Opened);
        flow.close();
        assert!(!flow.apply(ticket, GenerationEvent::Chunk("late".to_string())));
        assert!(flow.draft().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_stream_sends_nothing_more() {
        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        cancel.cancel();
        // A body that never yields
        pump_stream(stream::pending::<Result<&[u8], String>>(), &tx, &cancel, || {}).await;
        drop(tx);
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events, vec![GenerationEvent::Opened]);
    }

    #[test]
    fn test_decoder_joins_split_multibyte_char() {
        let mut decoder = Utf8StreamDecoder::new();
        let bytes = "héllo".as_bytes();
        // Split inside the two-byte 'é'
        assert_eq!(decoder.decode(&bytes[..2]), "h");
        assert_eq!(decoder.decode(&bytes[2..]), "éllo");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_decoder_flushes_truncated_tail() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&[b'x', 0xE2, 0x82]), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_save_requires_title() {
        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        flow.apply(ticket, GenerationEvent::Opened);
        flow.apply(ticket, GenerationEvent::Chunk("body".to_string()));

        assert_eq!(flow.save(), Err(DraftError::MissingTitle));
        assert_eq!(
            flow.draft().unwrap().error.as_deref(),
            Some("A title is required to save the prompt.")
        );

        let draft = flow.draft_mut().unwrap();
        draft.title = "My prompt".to_string();
        draft.tags = "#python, api".to_string();
        let record = flow.save().unwrap();

        assert_eq!(record.title, "My prompt");
        assert_eq!(record.description, "body");
        assert_eq!(record.tags, vec!["python".to_string(), "api".to_string()]);
        assert!(flow.draft().is_none());
    }

    #[test]
    fn test_save_without_draft_reports_no_draft() {
        let mut flow = GenerationFlow::new();
        assert_eq!(flow.save(), Err(DraftError::NoDraft));
    }

    #[test]
    fn test_new_run_discards_previous_draft() {
        let mut flow = GenerationFlow::new();
        let first = flow.start(&["a".to_string()]).unwrap();
        flow.apply(first, GenerationEvent::Opened);
        flow.apply(first, GenerationEvent::Chunk("old text".to_string()));
        flow.apply(first, GenerationEvent::Finished);

        let second = flow.start(&["b".to_string()]).unwrap();
        assert!(flow.draft().is_none());
        assert!(flow.is_busy());

        // The new run fails before any body arrives; no stale dialog remains
        flow.apply(second, GenerationEvent::Failed("connection refused".to_string()));
        assert!(flow.draft().is_none());
        assert!(!flow.is_busy());
    }

    #[test]
    fn test_rejected_start_keeps_open_draft() {
        let mut flow = GenerationFlow::new();
        let ticket = flow.start(&["a".to_string()]).unwrap();
        flow.apply(ticket, GenerationEvent::Opened);
        flow.apply(ticket, GenerationEvent::Finished);

        assert_eq!(flow.start(&[]), Err(GenerateError::EmptySelection));
        assert!(flow.draft().is_some());
    }
}
