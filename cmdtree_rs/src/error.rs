//! Error taxonomy for tree construction, argument declaration, and dispatch.
//!
//! Everything except [`TreeError::InvalidInput`] signals a programming
//! mistake in the tree declaration and is expected to abort the program;
//! none of these are user-recoverable at runtime.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    /// A registry read (or dispatch) happened before the tree-wide parse
    /// pass filled the value slots.
    #[error("{what} attempted before the tree-wide parse ran")]
    UsageOrder { what: String },

    /// A would-be node full name collides with an existing node anywhere
    /// in the tree.
    #[error("node name `{name}` is already used in this tree")]
    DuplicateName { name: String },

    /// A referenced parent or node full name does not exist.
    #[error("cannot find the node `{name}`")]
    NodeLookup { name: String },

    /// Malformed argument declaration: missing help, conflicting
    /// positional/optional spellings, a default that does not satisfy the
    /// declared type, or an unsupported spelling combination.
    #[error("bad argument spec: {reason}")]
    ArgumentSpec { reason: String },

    /// Malformed user input, surfaced untouched from the underlying parser.
    /// `Tree::parse` defers to clap's own usage message and exit code
    /// instead of returning this.
    #[error(transparent)]
    InvalidInput(#[from] clap::Error),
}

impl TreeError {
    pub(crate) fn spec(reason: impl Into<String>) -> Self {
        TreeError::ArgumentSpec {
            reason: reason.into(),
        }
    }
}
