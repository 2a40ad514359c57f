//! Idea classification toggle
//!
//! The edit-controls button cycles between hiding badges, re-showing cached
//! labels and asking the backend for fresh ones.

use std::collections::HashMap;

use crate::backend::{ClassifyItem, Verdict};
use crate::canvas::{Classification, Node};

/// What a press on the classify button should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyAction {
    Hide,
    Show,
    Request(Vec<ClassifyItem>),
}

/// Ticket for one classification request
pub type Ticket = u64;

#[derive(Debug, Default)]
pub struct ClassificationFlow {
    visible: bool,
    busy: bool,
    ticket: Ticket,
}

impl ClassificationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Decide what the toggle does for the current nodes
    pub fn toggle(&mut self, nodes: &[Node]) -> ClassifyAction {
        if self.visible {
            self.visible = false;
            return ClassifyAction::Hide;
        }

        if nodes.iter().all(|n| n.classification.is_some()) {
            self.visible = true;
            return ClassifyAction::Show;
        }

        ClassifyAction::Request(
            nodes
                .iter()
                .map(|n| ClassifyItem {
                    id: n.id.clone(),
                    content: n.content.clone(),
                })
                .collect(),
        )
    }

    /// Mark a request as in flight and return its ticket
    pub fn begin_request(&mut self) -> Ticket {
        self.ticket += 1;
        self.busy = true;
        self.ticket
    }

    /// Drop whatever request is in flight; its result will be ignored
    pub fn cancel(&mut self) {
        self.ticket += 1;
        self.busy = false;
    }

    /// Nodes were replaced or cleared: badges go away with them
    pub fn reset(&mut self) {
        self.cancel();
        self.visible = false;
    }

    /// Apply a finished request. Returns false if the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Verdict>, String>,
        nodes: &mut [Node],
    ) -> bool {
        if ticket != self.ticket || !self.busy {
            return false;
        }
        self.busy = false;

        match result {
            Ok(verdicts) => {
                let updated = merge_verdicts(nodes, &verdicts);
                log::info!("Classified {} of {} nodes", updated, nodes.len());
                self.visible = true;
            }
            Err(e) => {
                log::error!("Error calling classify-nodes: {}", e);
            }
        }
        true
    }
}

/// Copy verdicts onto nodes by id; unknown ids are ignored and nodes without a
/// verdict keep whatever they had. Returns how many nodes were labelled.
pub fn merge_verdicts(nodes: &mut [Node], verdicts: &[Verdict]) -> usize {
    let by_id: HashMap<&str, i64> = verdicts.iter().map(|v| (v.id.as_str(), v.m)).collect();

    let mut updated = 0;
    for node in nodes.iter_mut() {
        if let Some(&m) = by_id.get(node.id.as_str()) {
            node.classification = Some(Classification::from_verdict(m));
            updated += 1;
        }
    }
    updated
}
