use serde::Serialize;

/// What one simplification run did, tallied as the passes go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub user_turns: usize,
    pub model_turns: usize,
    /// Noise subtrees removed from inside turns.
    pub noise_removed: usize,
    /// All kept expand/collapse buttons, thinking ones included.
    pub expanders: usize,
    /// Expanders that sit inside a thinking/reasoning block.
    pub thinking_expanders: usize,
    pub code_copy_buttons: usize,
    pub discarded_buttons: usize,
    /// Attachment or deliverable chips that will not be archived.
    pub attachments: usize,
}

impl Summary {
    pub fn turns(&self) -> usize {
        self.user_turns + self.model_turns
    }
}
