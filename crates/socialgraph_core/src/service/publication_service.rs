//! Publication use-case service.
//!
//! # Responsibility
//! - Create publications and derive `mentions`/`has_tag` links from the body.
//! - Guard immutable fields on update.
//! - Expose author, tag and mention listings.
//!
//! # Invariants
//! - Author reassignment is rejected with `InvalidOperation`.
//! - Derived links are computed only at creation time.

use crate::content::{extract_hashtags, extract_mentions};
use crate::model::now_epoch_ms;
use crate::model::publication::{Publication, PublicationId, PublicationPatch};
use crate::model::publisher::PublisherId;
use crate::model::tag::TagId;
use crate::model::EntityRef;
use crate::repo::publication_repo::{CreatedLinks, PublicationRepository};
use crate::service::{GraphError, GraphResult};
use log::info;

/// Publication plus the links created alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPublication {
    pub publication: Publication,
    pub links: CreatedLinks,
}

/// Publication service facade over repository implementations.
pub struct PublicationService<R: PublicationRepository> {
    repo: R,
}

impl<R: PublicationRepository> PublicationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a publication authored by `author_id`.
    ///
    /// `@handle` tokens naming existing publishers become `mentions` edges;
    /// `#tag` tokens become `has_tag` edges, creating tags on first use.
    pub fn create(
        &self,
        author_id: PublisherId,
        body: impl Into<String>,
    ) -> GraphResult<CreatedPublication> {
        let body = validated_body(body.into())?;
        let mentions = extract_mentions(&body);
        let hashtags = extract_hashtags(&body);
        let publication = Publication::new(author_id, body);

        let links = self
            .repo
            .create_publication(&publication, &mentions, &hashtags)?;

        info!(
            "event=publication_create module=graph status=ok publication_id={} author_id={} mentions={} tags={}",
            publication.id,
            author_id,
            links.mentioned.len(),
            links.tagged.len()
        );
        Ok(CreatedPublication { publication, links })
    }

    pub fn get(&self, id: PublicationId) -> GraphResult<Publication> {
        self.repo
            .get_publication(id)?
            .ok_or(GraphError::NotFound(EntityRef::Publication(id)))
    }

    pub fn list_by_author(&self, author_id: PublisherId) -> GraphResult<Vec<Publication>> {
        Ok(self.repo.list_by_author(author_id)?)
    }

    pub fn list_by_tag(&self, tag_id: TagId) -> GraphResult<Vec<Publication>> {
        Ok(self.repo.list_by_tag(tag_id)?)
    }

    pub fn list_mentioning(&self, publisher_id: PublisherId) -> GraphResult<Vec<Publication>> {
        Ok(self.repo.list_mentioning(publisher_id)?)
    }

    /// Applies a partial update. Only `body` may change.
    pub fn update(&self, id: PublicationId, patch: PublicationPatch) -> GraphResult<Publication> {
        let mut publication = self.get(id)?;
        if let Some(author_id) = patch.author_id {
            if author_id != publication.author_id {
                return Err(GraphError::InvalidOperation(format!(
                    "author of publication {id} cannot be reassigned"
                )));
            }
        }

        let Some(body) = patch.body else {
            return Ok(publication);
        };
        let body = validated_body(body)?;
        let updated_at = now_epoch_ms().max(publication.updated_at);
        self.repo.update_body(id, &body, updated_at)?;
        publication.body = body;
        publication.updated_at = updated_at;
        Ok(publication)
    }

    /// Deletes a publication and cascades its edges.
    pub fn delete(&self, id: PublicationId) -> GraphResult<u64> {
        let removed_edges = self.repo.delete_publication(id)?;
        info!(
            "event=publication_delete module=graph status=ok publication_id={} removed_edges={}",
            id, removed_edges
        );
        Ok(removed_edges)
    }
}

fn validated_body(body: String) -> GraphResult<String> {
    if body.trim().is_empty() {
        return Err(GraphError::InvalidInput(
            "publication body must not be blank".to_string(),
        ));
    }
    Ok(body)
}
