//! Definition subsystem.
//!
//! # Data Flow
//! ```text
//! API root directory
//!     → source.rs (walk tree, read files)
//!     → parser.rs (filename grammar → RouteKey, status, state tags)
//!     → envelope.rs (content → Plain / Extended payload)
//!     → ParsedDefinition[] → routing::Registry::build
//!
//! On change (watch mode):
//!     watcher.rs detects change
//!     → source.rs recompiles the whole tree
//!     → new Registry sent to the server for an atomic swap
//! ```
//!
//! # Design Decisions
//! - The filename is the only source of method, status and state tags
//! - Envelope detection happens once at parse time; downstream code only sees `Payload`
//! - One bad file never hides the others: errors are collected per file

pub mod envelope;
pub mod parser;
pub mod source;
pub mod watcher;

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::routing::pattern::PatternError;
use crate::routing::RouteKey;

pub use parser::parse_definition;
pub use source::{compile, CompileMode, Compiled};
pub use watcher::DefinitionWatcher;

/// Response payload of a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The whole file content is the body.
    Plain { body: Option<Value> },
    /// The body came from `__body`; headers and status were merged already.
    Extended { body: Option<Value> },
}

/// One concrete response for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// Raw file content as read from disk.
    pub content: String,
    pub payload: Payload,
}

impl Variant {
    pub fn is_extended(&self) -> bool {
        matches!(self.payload, Payload::Extended { .. })
    }

    pub fn body(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Plain { body } | Payload::Extended { body } => body.as_ref(),
        }
    }
}

/// Output of parsing a single file: one entry per state tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDefinition {
    pub key: RouteKey,
    /// `None` marks the default variant of the route.
    pub tag: Option<String>,
    pub variant: Variant,
    /// Relative path of the file this entry came from.
    pub source: String,
}

/// What went wrong with a definition file.
#[derive(Debug, Error)]
pub enum DefinitionErrorKind {
    #[error("unsupported file extension `{0}` (expected `.json`)")]
    UnsupportedExtension(String),

    #[error("route name is empty")]
    EmptyName,

    #[error("invalid path: {0}")]
    Pattern(#[from] PatternError),

    #[error("unrecognised filename token `{0}`")]
    UnknownToken(String),

    #[error("token `{0}` is out of order or repeated (expected name.METHOD.STATUS.{{STATE}})")]
    MisplacedToken(String),

    #[error("invalid status code `{0}`")]
    InvalidStatus(String),

    #[error("invalid state tag `{0}`")]
    InvalidStateTag(String),

    #[error(transparent)]
    Content(#[from] envelope::EnvelopeError),

    #[error("unreadable file: {0}")]
    Io(#[from] std::io::Error),
}

/// A definition file that could not be turned into a route.
#[derive(Debug, Error)]
#[error("{file}: {kind}")]
pub struct DefinitionError {
    pub file: String,
    pub kind: DefinitionErrorKind,
}

impl DefinitionError {
    pub fn new(file: impl Into<String>, kind: impl Into<DefinitionErrorKind>) -> Self {
        Self {
            file: file.into(),
            kind: kind.into(),
        }
    }
}
