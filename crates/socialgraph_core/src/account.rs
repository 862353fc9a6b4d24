//! Account collaborator seam.
//!
//! Publishers may link to an identity owned by an external account system.
//! The core only needs to know whether a reference resolves.

use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity returned by a successful account lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    pub account_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookupError {
    /// The account system has no such reference.
    NotFound(String),
    /// The account system could not answer.
    Unavailable(String),
}

impl Display for AccountLookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(account_ref) => write!(f, "account not found: `{account_ref}`"),
            Self::Unavailable(message) => write!(f, "account lookup unavailable: {message}"),
        }
    }
}

impl Error for AccountLookupError {}

/// Resolves external account references.
pub trait AccountResolver {
    fn resolve_account(&self, account_ref: &str) -> Result<AccountIdentity, AccountLookupError>;
}

impl<T: AccountResolver + ?Sized> AccountResolver for &T {
    fn resolve_account(&self, account_ref: &str) -> Result<AccountIdentity, AccountLookupError> {
        (**self).resolve_account(account_ref)
    }
}

/// Accepts any non-blank reference. Used when no account system is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccountDirectory;

impl AccountResolver for OpenAccountDirectory {
    fn resolve_account(&self, account_ref: &str) -> Result<AccountIdentity, AccountLookupError> {
        let trimmed = account_ref.trim();
        if trimmed.is_empty() {
            return Err(AccountLookupError::NotFound(account_ref.to_string()));
        }
        Ok(AccountIdentity {
            account_ref: trimmed.to_string(),
        })
    }
}

/// Fixed set of known accounts.
#[derive(Debug, Clone, Default)]
pub struct StaticAccountDirectory {
    accounts: HashSet<String>,
}

impl StaticAccountDirectory {
    pub fn new<I, S>(accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accounts: accounts.into_iter().map(Into::into).collect(),
        }
    }
}

impl AccountResolver for StaticAccountDirectory {
    fn resolve_account(&self, account_ref: &str) -> Result<AccountIdentity, AccountLookupError> {
        let trimmed = account_ref.trim();
        if self.accounts.contains(trimmed) {
            Ok(AccountIdentity {
                account_ref: trimmed.to_string(),
            })
        } else {
            Err(AccountLookupError::NotFound(trimmed.to_string()))
        }
    }
}
