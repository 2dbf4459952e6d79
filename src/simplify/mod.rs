mod assemble;
mod buttons;

pub use assemble::assemble;
pub use buttons::{ButtonClass, classify_button, icon_name, process_buttons};

use crate::dom::{self, Dom, NodeId};
use crate::error::SimplifyError;
use crate::report::Summary;
use crate::selector::Selector;
use regex::Regex;
use std::sync::LazyLock;

// ===================================================================
// Markup the exporting application uses, and markers we write back
// ===================================================================

pub const USER_TURN: &str = "user-query";
pub const MODEL_TURN: &str = "model-response";

pub const WRAPPER_ID: &str = "simplified-conversation";

pub const EXPANDER_CLASS: &str = "js-expand-btn";
pub const EXPANDER_ATTR: &str = "data-is-expander";
pub const THINKING_BUTTON_CLASS: &str = "js-thinking-btn";
pub const THINKING_HEADER_CLASS: &str = "js-thinking-header";
pub const BUBBLE_ANCHOR_CLASS: &str = "js-relative-anchor";
pub const CODE_COPY_CLASS: &str = "js-copy-code-btn";

/// Footers, disclaimers, banners and the scroll placeholder.
const NOISE: &[&str] = &[
    "message-actions",
    ".response-footer",
    ".response-container-footer",
    "freemium-rag-disclaimer",
    "sensitive-memories-banner",
    ".restart-chat-button-scroll-placeholder",
];

/// Uploaded files and immersive deliverables are only referenced, never
/// embedded, in an export.
const ATTACHMENT_TAGS: &[&str] = &["immersive-entry-chip", "user-query-file-carousel"];

static NOISE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    NOISE
        .iter()
        .map(|s| match Selector::parse(s) {
            Ok(selector) => selector,
            // Panic is ok thanks to the `builtin_noise_selectors_parse` test.
            Err(err) => panic!("{err}"),
        })
        .collect()
});

pub(crate) fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Panic is ok: every pattern is a literal exercised by the tests.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

// ===================================================================
// Turns
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    User,
    Model,
}

/// One conversation item. Identity is the node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub id: NodeId,
    pub kind: TurnKind,
}

/// Every user and model turn under `scope`, in document order.
pub fn select_turns(dom: &Dom, scope: NodeId) -> Vec<Turn> {
    dom.find_all(scope, |e| e.is(USER_TURN) || e.is(MODEL_TURN))
        .into_iter()
        .map(|id| Turn {
            id,
            kind: if dom.tag_name(id) == Some(USER_TURN) {
                TurnKind::User
            } else {
                TurnKind::Model
            },
        })
        .collect()
}

/// Remove every subtree under `turn` matched by the built-in noise selectors
/// or by `extra`. Returns how many subtrees were removed.
pub fn remove_noise(dom: &mut Dom, turn: NodeId, extra: &[Selector]) -> usize {
    let mut removed = 0;
    for selector in NOISE_SELECTORS.iter().chain(extra) {
        for node in selector.select(dom, turn) {
            // An earlier match may already have taken this one with it.
            if dom.contains(turn, node) {
                dom.remove(node);
                removed += 1;
            }
        }
    }
    removed
}

pub fn count_attachments(dom: &Dom, scope: NodeId) -> usize {
    dom.find_all(scope, |e| ATTACHMENT_TAGS.iter().any(|t| e.is(t)))
        .len()
}

// ===================================================================
// Transcript: the whole pass over one parsed export
// ===================================================================

/// A parsed export and the turns found in it.
#[derive(Debug)]
pub struct Transcript {
    dom: Dom,
    turns: Vec<Turn>,
    summary: Summary,
}

impl Transcript {
    /// Parse an export. Fails when it holds no conversation items.
    pub fn parse(html: &str) -> Result<Self, SimplifyError> {
        let dom = dom::parse(html);
        let turns = select_turns(&dom, dom.root());
        if turns.is_empty() {
            return Err(SimplifyError::NoConversationItems);
        }
        let summary = Summary {
            user_turns: turns.iter().filter(|t| t.kind == TurnKind::User).count(),
            model_turns: turns.iter().filter(|t| t.kind == TurnKind::Model).count(),
            attachments: count_attachments(&dom, dom.root()),
            ..Default::default()
        };
        Ok(Self {
            dom,
            turns,
            summary,
        })
    }

    #[cfg(test)]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Strip noise and classify buttons in every turn, in place.
    pub fn clean(&mut self, extra_noise: &[Selector]) {
        for turn in &self.turns {
            let removed = remove_noise(&mut self.dom, turn.id, extra_noise);
            tracing::debug!(turn = ?turn.kind, removed, "removed noise");
            self.summary.noise_removed += removed;
            process_buttons(&mut self.dom, turn, &mut self.summary);
        }
    }

    /// Build the output document around the turns and serialize it.
    pub fn into_html(mut self, title: Option<&str>) -> String {
        let root = assemble(&mut self.dom, &self.turns, title);
        self.dom.to_html(root)
    }
}
