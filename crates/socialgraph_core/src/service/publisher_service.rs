//! Publisher use-case service.
//!
//! # Responsibility
//! - Validate handles and resolve account links before persistence.
//! - Provide create/get/update/delete plus handle and account lookups.

use crate::account::AccountResolver;
use crate::model::publisher::{normalize_handle, Publisher, PublisherId, PublisherPatch};
use crate::repo::publisher_repo::{require_publisher, PublisherRepository};
use crate::service::{GraphError, GraphResult};
use log::info;

/// Publisher service facade over a repository and account resolver.
pub struct PublisherService<R: PublisherRepository, A: AccountResolver> {
    repo: R,
    accounts: A,
}

impl<R: PublisherRepository, A: AccountResolver> PublisherService<R, A> {
    pub fn new(repo: R, accounts: A) -> Self {
        Self { repo, accounts }
    }

    /// Registers a publisher, optionally linked to an external account.
    pub fn create(
        &self,
        account_ref: Option<String>,
        handle: impl AsRef<str>,
    ) -> GraphResult<Publisher> {
        let handle = validated_handle(handle.as_ref())?;
        let account_ref = self.resolve(account_ref)?;
        let publisher = Publisher::new(account_ref, handle);
        self.repo.create_publisher(&publisher)?;
        info!(
            "event=publisher_create module=graph status=ok publisher_id={} linked={}",
            publisher.id,
            publisher.account_ref.is_some()
        );
        Ok(publisher)
    }

    pub fn get(&self, id: PublisherId) -> GraphResult<Publisher> {
        Ok(require_publisher(&self.repo, id)?)
    }

    pub fn find_by_handle(&self, handle: &str) -> GraphResult<Option<Publisher>> {
        Ok(self.repo.find_by_handle(handle)?)
    }

    pub fn find_by_account(&self, account_ref: &str) -> GraphResult<Option<Publisher>> {
        Ok(self.repo.find_by_account(account_ref.trim())?)
    }

    pub fn list(&self) -> GraphResult<Vec<Publisher>> {
        Ok(self.repo.list_publishers()?)
    }

    /// Applies a partial update; unspecified fields keep their values.
    pub fn update(&self, id: PublisherId, patch: PublisherPatch) -> GraphResult<Publisher> {
        let mut publisher = require_publisher(&self.repo, id)?;
        if let Some(handle) = patch.handle {
            publisher.handle = validated_handle(&handle)?;
        }
        if let Some(account_ref) = patch.account_ref {
            publisher.account_ref = self.resolve(account_ref)?;
        }
        self.repo.update_publisher(&publisher)?;
        Ok(publisher)
    }

    /// Deletes a publisher with no authored publications and no edges.
    pub fn delete(&self, id: PublisherId) -> GraphResult<()> {
        self.repo.delete_publisher(id)?;
        info!("event=publisher_delete module=graph status=ok publisher_id={id}");
        Ok(())
    }

    fn resolve(&self, account_ref: Option<String>) -> GraphResult<Option<String>> {
        match account_ref {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Err(GraphError::InvalidInput(
                "account_ref must not be blank".to_string(),
            )),
            Some(raw) => {
                let identity = self.accounts.resolve_account(raw.trim())?;
                Ok(Some(identity.account_ref))
            }
        }
    }
}

fn validated_handle(raw: &str) -> GraphResult<String> {
    normalize_handle(raw).map_err(|err| GraphError::InvalidInput(err.to_string()))
}
