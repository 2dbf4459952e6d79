use std::path::PathBuf;
use thiserror::Error;

/// Failures that end a run before any output is written.
#[derive(Debug, Error)]
pub enum SimplifyError {
    #[error("could not find {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("no <user-query> or <model-response> elements found")]
    NoConversationItems,

    #[error("output {} would overwrite the input", .0.display())]
    SameInputAndOutput(PathBuf),
}
