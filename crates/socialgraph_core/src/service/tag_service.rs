//! Tag use-case service.
//!
//! # Responsibility
//! - Normalize tag names and provide idempotent get-or-create.
//! - Apply the configured delete policy.
//! - List recently used tags.

use crate::config::TagDeletePolicy;
use crate::model::now_epoch_ms;
use crate::model::tag::{normalize_tag_name, Tag, TagId};
use crate::model::EntityRef;
use crate::repo::tag_repo::TagRepository;
use crate::service::{GraphError, GraphResult};
use log::info;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Tag service facade over repository implementations.
pub struct TagService<R: TagRepository> {
    repo: R,
    delete_policy: TagDeletePolicy,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R, delete_policy: TagDeletePolicy) -> Self {
        Self {
            repo,
            delete_policy,
        }
    }

    /// Returns the tag for `name`, creating it on first use.
    pub fn get_or_create(&self, name: &str) -> GraphResult<Tag> {
        let normalized = normalize_tag_name(name)
            .ok_or_else(|| GraphError::InvalidInput(format!("invalid tag: `{name}`")))?;
        Ok(self.repo.get_or_create_tag(&normalized)?)
    }

    pub fn get(&self, id: TagId) -> GraphResult<Tag> {
        self.repo
            .get_tag(id)?
            .ok_or(GraphError::NotFound(EntityRef::Tag(id)))
    }

    pub fn find_by_name(&self, name: &str) -> GraphResult<Option<Tag>> {
        match normalize_tag_name(name) {
            Some(normalized) => Ok(self.repo.find_by_name(&normalized)?),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> GraphResult<Vec<Tag>> {
        Ok(self.repo.list_tags()?)
    }

    /// Tags attached at or after `since_epoch_ms`, most recent first.
    pub fn recently_used(&self, since_epoch_ms: i64) -> GraphResult<Vec<Tag>> {
        Ok(self.repo.list_used_since(since_epoch_ms)?)
    }

    /// Tags attached within the last `days` days.
    pub fn recently_used_within_days(&self, days: u32) -> GraphResult<Vec<Tag>> {
        let cutoff = now_epoch_ms().saturating_sub(i64::from(days).saturating_mul(DAY_MS));
        self.recently_used(cutoff)
    }

    /// Deletes a tag under the configured policy.
    ///
    /// Returns how many publications were detached.
    pub fn delete(&self, id: TagId) -> GraphResult<u64> {
        let detached = self.repo.delete_tag(id, self.delete_policy)?;
        info!(
            "event=tag_delete module=graph status=ok tag_id={} policy={:?} detached={}",
            id, self.delete_policy, detached
        );
        Ok(detached)
    }

    pub fn delete_policy(&self) -> TagDeletePolicy {
        self.delete_policy
    }
}
