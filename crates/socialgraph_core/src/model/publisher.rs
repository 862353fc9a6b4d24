//! Publisher domain model.
//!
//! # Invariants
//! - `handle` is trimmed, non-empty and shaped so `@handle` in a body can
//!   mention it: word characters, with `.` and `-` allowed only between them.
//! - Uniqueness and lookups use `handle_key`, the Unicode-lowercased handle.
//! - `account_ref`, when set, links to exactly one publisher.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable publisher identifier.
pub type PublisherId = Uuid;

const HANDLE_MAX_CHARS: usize = 64;

static HANDLE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w(?:[\w.-]*\w)?$").expect("valid handle regex"));

/// Account-holding actor that authors publications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: PublisherId,
    /// One-to-one link to an external account identity.
    pub account_ref: Option<String>,
    /// Display identifier, unique case-insensitively.
    pub handle: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Publisher {
    /// Creates a publisher with a generated id.
    pub fn new(account_ref: Option<String>, handle: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_ref,
            handle: handle.into(),
            created_at: super::now_epoch_ms(),
        }
    }
}

/// Partial update for a publisher.
///
/// `account_ref: Some(None)` unlinks the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherPatch {
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub account_ref: Option<Option<String>>,
}

/// Handle rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    Empty,
    TooLong(usize),
    ContainsWhitespace,
    StartsWithSigil,
    /// Contains characters a mention cannot capture, or starts or ends
    /// with `.`/`-`.
    InvalidShape,
}

impl Display for HandleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "handle must not be blank"),
            Self::TooLong(len) => {
                write!(f, "handle is {len} chars, max is {HANDLE_MAX_CHARS}")
            }
            Self::ContainsWhitespace => write!(f, "handle must not contain whitespace"),
            Self::StartsWithSigil => write!(f, "handle must not start with `@`"),
            Self::InvalidShape => write!(
                f,
                "handle may only use letters, digits, `_`, and inner `.` or `-`"
            ),
        }
    }
}

impl Error for HandleError {}

/// Trims and validates a handle, returning the stored form.
pub fn normalize_handle(raw: &str) -> Result<String, HandleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(HandleError::Empty);
    }
    if trimmed.starts_with('@') {
        return Err(HandleError::StartsWithSigil);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(HandleError::ContainsWhitespace);
    }
    let len = trimmed.chars().count();
    if len > HANDLE_MAX_CHARS {
        return Err(HandleError::TooLong(len));
    }
    if !HANDLE_SHAPE_RE.is_match(trimmed) {
        return Err(HandleError::InvalidShape);
    }
    Ok(trimmed.to_string())
}

/// Case-folded form used for uniqueness and `@mention` lookups.
pub fn handle_key(handle: &str) -> String {
    handle.trim().to_lowercase()
}
