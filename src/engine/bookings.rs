use std::time::Instant;

use tracing::debug;
use ulid::Ulid;

use crate::model::{Actor, Booking, Span};
use crate::observability;

use super::conflict::check_no_conflict;
use super::{policy, Engine, EngineError, Entity};

impl Engine {
    /// Create a booking for the actor. Non-admins get the overlap scan;
    /// admins may double-book on purpose (override). The scan and the commit
    /// run inside the room's critical section so two concurrent creates for
    /// the same slot cannot both pass the scan.
    pub async fn create_booking(
        &self,
        actor: &Actor,
        room_id: Ulid,
        span: Span,
    ) -> Result<Booking, EngineError> {
        let lock = self.room_lock(room_id);
        let _section = lock.lock().await;

        if self.store.get_room(room_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Room));
        }

        if !policy::overrides_conflicts(actor) {
            let existing = self.store.bookings_for_room(room_id).await?;
            if let Err(e) = check_no_conflict(&existing, &span, None) {
                metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                return Err(e);
            }
        }

        let booking = Booking {
            id: Ulid::new(),
            user_id: actor.id,
            room_id,
            span,
        };
        self.commit_booking(booking).await
    }

    /// The breaker-guarded commit. An open circuit rejects before the store
    /// is touched; a store failure surfaces as `Internal` and counts toward
    /// the trip threshold.
    async fn commit_booking(&self, booking: Booking) -> Result<Booking, EngineError> {
        self.breaker.admit()?;
        let start = Instant::now();
        match self.store.insert_booking(booking.clone()).await {
            Ok(()) => {
                self.breaker.record_success();
                metrics::histogram!(observability::BOOKING_COMMIT_DURATION_SECONDS)
                    .record(start.elapsed().as_secs_f64());
                metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
                debug!(booking = %booking.id, room = %booking.room_id, "booking committed");
                Ok(booking)
            }
            Err(e) => {
                self.breaker.record_failure();
                Err(EngineError::Internal(e.to_string()))
            }
        }
    }

    /// Move a booking to a new room and/or slot. Owner or admin; non-admins
    /// re-run the overlap scan against the target room, excluding the
    /// booking's own prior identity.
    pub async fn update_booking(
        &self,
        actor: &Actor,
        booking_id: Ulid,
        room_id: Ulid,
        span: Span,
    ) -> Result<Booking, EngineError> {
        let mut booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Booking))?;
        policy::require_owner_or_admin(actor, booking.user_id, "not allowed to update this booking")?;

        let lock = self.room_lock(room_id);
        let _section = lock.lock().await;

        if !policy::overrides_conflicts(actor) {
            let existing = self.store.bookings_for_room(room_id).await?;
            if let Err(e) = check_no_conflict(&existing, &span, Some(booking_id)) {
                metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
                return Err(e);
            }
        }

        booking.room_id = room_id;
        booking.span = span;
        self.store.update_booking(booking.clone()).await?;
        debug!(booking = %booking.id, room = %room_id, "booking updated");
        Ok(booking)
    }

    /// Cancel a booking: owner or admin. Hard delete — bookings have no
    /// tombstone, unlike reviews.
    pub async fn cancel_booking(&self, actor: &Actor, booking_id: Ulid) -> Result<(), EngineError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Booking))?;
        policy::require_owner_or_admin(actor, booking.user_id, "not allowed to cancel this booking")?;

        self.store.delete_booking(booking_id).await?;
        debug!(booking = %booking_id, "booking cancelled");
        Ok(())
    }

    /// Read-only availability probe, no auth. Always scans as non-override.
    pub async fn check_availability(&self, room_id: Ulid, span: Span) -> Result<bool, EngineError> {
        if self.store.get_room(room_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Room));
        }
        let existing = self.store.bookings_for_room(room_id).await?;
        Ok(check_no_conflict(&existing, &span, None).is_ok())
    }

    /// Admin and facility managers see the full set; everyone else only
    /// their own bookings.
    pub async fn list_bookings(&self, actor: &Actor) -> Result<Vec<Booking>, EngineError> {
        if policy::sees_all_bookings(actor.role) {
            Ok(self.store.list_bookings().await?)
        } else {
            Ok(self.store.bookings_for_user(actor.id).await?)
        }
    }

    /// Admin-only: inspect any user's full booking history.
    pub async fn booking_history(
        &self,
        actor: &Actor,
        username: &str,
    ) -> Result<Vec<Booking>, EngineError> {
        policy::require_admin(actor, "not enough permissions")?;
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(EngineError::NotFound(Entity::User))?;
        Ok(self.store.bookings_for_user(user.id).await?)
    }
}
