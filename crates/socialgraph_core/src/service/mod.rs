//! Core use-case services.
//!
//! # Responsibility
//! - Enforce domain invariants above the repositories (handle shape,
//!   self-follow, author immutability, account resolution).
//! - Map storage errors onto the caller-facing error kinds.
//!
//! # Invariants
//! - Services never bypass repository transactions.
//! - Every failure is returned as a typed `GraphError`; nothing is retried.

pub mod graph_service;
pub mod publication_service;
pub mod publisher_service;
pub mod tag_service;

use crate::account::AccountLookupError;
use crate::model::EntityRef;
use crate::repo::{Conflict, RepoError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GraphResult<T> = Result<T, GraphError>;

/// Stable, transport-friendly classification of a `GraphError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidOperation,
    InvalidInput,
    Upstream,
    Storage,
}

/// Error returned by every graph operation.
#[derive(Debug)]
pub enum GraphError {
    /// Referenced entity id does not exist.
    NotFound(EntityRef),
    /// Uniqueness violation, or deletion blocked by references.
    Conflict(Conflict),
    /// Self-follow or immutable-field mutation.
    InvalidOperation(String),
    /// Malformed argument (blank body, bad handle, blank tag).
    InvalidInput(String),
    /// Account collaborator could not answer.
    AccountLookup(AccountLookupError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::AccountLookup(_) => ErrorKind::Upstream,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Conflict(conflict) => write!(f, "conflict: {conflict}"),
            Self::InvalidOperation(message) => write!(f, "invalid operation: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::AccountLookup(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AccountLookup(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GraphError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            RepoError::Conflict(conflict) => Self::Conflict(conflict),
            other => Self::Repo(other),
        }
    }
}

impl From<AccountLookupError> for GraphError {
    fn from(value: AccountLookupError) -> Self {
        match value {
            AccountLookupError::NotFound(account_ref) => {
                Self::NotFound(EntityRef::Account(account_ref))
            }
            other => Self::AccountLookup(other),
        }
    }
}
