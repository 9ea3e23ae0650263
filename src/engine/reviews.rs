//! Review moderation: {active, deleted} × {flagged, unflagged}. The two
//! flags are independent — flagging is a moderation signal, not a visibility
//! filter.

use tracing::debug;
use ulid::Ulid;

use crate::model::{Actor, Review, ReviewPatch};

use super::{policy, Engine, EngineError, Entity};

impl Engine {
    /// Leave a review on a room. Authorship is always the actor.
    pub async fn create_review(
        &self,
        actor: &Actor,
        room_id: Ulid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, EngineError> {
        if self.store.get_room(room_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Room));
        }

        let review = Review {
            id: Ulid::new(),
            user_id: actor.id,
            room_id,
            rating,
            comment,
            flagged: false,
            deleted: false,
        };
        self.store.insert_review(review.clone()).await?;
        Ok(review)
    }

    /// Partial update of rating/comment. A deleted review is immutable for
    /// everyone; otherwise author or admin.
    pub async fn update_review(
        &self,
        actor: &Actor,
        review_id: Ulid,
        patch: ReviewPatch,
    ) -> Result<Review, EngineError> {
        let mut review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Review))?;
        if review.deleted {
            return Err(EngineError::BadRequest("cannot update a deleted review"));
        }
        policy::require_owner_or_admin(actor, review.user_id, "not allowed to update this review")?;

        if let Some(rating) = patch.rating {
            review.rating = rating;
        }
        if let Some(comment) = patch.comment {
            review.comment = Some(comment);
        }
        self.store.update_review(review.clone()).await?;
        Ok(review)
    }

    /// Soft-delete. Author or admin. Deleting an already-deleted review is a
    /// no-op success.
    pub async fn delete_review(&self, actor: &Actor, review_id: Ulid) -> Result<(), EngineError> {
        let mut review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Review))?;
        policy::require_owner_or_admin(actor, review.user_id, "not allowed to delete this review")?;

        if !review.deleted {
            review.deleted = true;
            self.store.update_review(review).await?;
            debug!(review = %review_id, "review soft-deleted");
        }
        Ok(())
    }

    /// Admin-only restore. Clears `deleted`, leaves `flagged` untouched.
    pub async fn restore_review(&self, actor: &Actor, review_id: Ulid) -> Result<(), EngineError> {
        policy::require_admin(actor, "not enough permissions")?;
        let mut review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Review))?;
        review.deleted = false;
        self.store.update_review(review).await?;
        debug!(review = %review_id, "review restored");
        Ok(())
    }

    /// Admin-only moderation marker, independent of `deleted`.
    pub async fn flag_review(&self, actor: &Actor, review_id: Ulid) -> Result<(), EngineError> {
        self.set_flagged(actor, review_id, true).await
    }

    pub async fn unflag_review(&self, actor: &Actor, review_id: Ulid) -> Result<(), EngineError> {
        self.set_flagged(actor, review_id, false).await
    }

    async fn set_flagged(
        &self,
        actor: &Actor,
        review_id: Ulid,
        flagged: bool,
    ) -> Result<(), EngineError> {
        policy::require_admin(actor, "not enough permissions")?;
        let mut review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Review))?;
        review.flagged = flagged;
        self.store.update_review(review).await?;
        Ok(())
    }

    /// Public listing: non-deleted reviews only; flagged reviews included.
    pub async fn reviews_for_room(&self, room_id: Ulid) -> Result<Vec<Review>, EngineError> {
        Ok(self.store.reviews_for_room(room_id, false).await?)
    }
}
