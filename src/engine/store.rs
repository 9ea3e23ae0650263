use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{Booking, Review, Room, User};

/// Opaque storage failure. The engine maps these to `EngineError::Internal`;
/// on the booking-create path they also count toward the breaker's trip
/// threshold.
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// The persistence capability. Every write is all-or-nothing per call;
/// serializing conflicting writes across calls is the engine's job (per-room
/// critical section on the create path).
#[async_trait]
pub trait Repository: Send + Sync {
    // ── Users ────────────────────────────────────────────────────
    async fn insert_user(&self, user: User) -> StoreResult<()>;
    async fn get_user(&self, id: Ulid) -> StoreResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn username_or_email_taken(&self, username: &str, email: &str) -> StoreResult<bool>;
    async fn update_user(&self, user: User) -> StoreResult<()>;
    /// Removes the user and, cascading, their bookings and reviews.
    async fn delete_user(&self, id: Ulid) -> StoreResult<()>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    // ── Rooms ────────────────────────────────────────────────────
    async fn insert_room(&self, room: Room) -> StoreResult<()>;
    async fn get_room(&self, id: Ulid) -> StoreResult<Option<Room>>;
    async fn get_room_by_name(&self, name: &str) -> StoreResult<Option<Room>>;
    async fn update_room(&self, room: Room) -> StoreResult<()>;
    /// Removes the room and, cascading, its bookings and reviews.
    async fn delete_room(&self, id: Ulid) -> StoreResult<()>;
    async fn list_rooms(&self) -> StoreResult<Vec<Room>>;

    // ── Bookings ─────────────────────────────────────────────────
    async fn insert_booking(&self, booking: Booking) -> StoreResult<()>;
    async fn get_booking(&self, id: Ulid) -> StoreResult<Option<Booking>>;
    async fn update_booking(&self, booking: Booking) -> StoreResult<()>;
    async fn delete_booking(&self, id: Ulid) -> StoreResult<()>;
    async fn bookings_for_room(&self, room_id: Ulid) -> StoreResult<Vec<Booking>>;
    async fn bookings_for_user(&self, user_id: Ulid) -> StoreResult<Vec<Booking>>;
    async fn list_bookings(&self) -> StoreResult<Vec<Booking>>;

    // ── Reviews ──────────────────────────────────────────────────
    async fn insert_review(&self, review: Review) -> StoreResult<()>;
    async fn get_review(&self, id: Ulid) -> StoreResult<Option<Review>>;
    async fn update_review(&self, review: Review) -> StoreResult<()>;
    async fn reviews_for_room(&self, room_id: Ulid, include_deleted: bool)
        -> StoreResult<Vec<Review>>;
}

/// DashMap-backed repository. Never fails; exists for embedding and tests.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Ulid, User>,
    rooms: DashMap<Ulid, Room>,
    bookings: DashMap<Ulid, Booking>,
    reviews: DashMap<Ulid, Review>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: Ulid) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|e| e.value().clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|e| e.value().username == username)
            .map(|e| e.value().clone()))
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> StoreResult<bool> {
        Ok(self
            .users
            .iter()
            .any(|e| e.value().username == username || e.value().email == email))
    }

    async fn update_user(&self, user: User) -> StoreResult<()> {
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn delete_user(&self, id: Ulid) -> StoreResult<()> {
        self.users.remove(&id);
        self.bookings.retain(|_, b| b.user_id != id);
        self.reviews.retain(|_, r| r.user_id != id);
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.iter().map(|e| e.value().clone()).collect())
    }

    async fn insert_room(&self, room: Room) -> StoreResult<()> {
        self.rooms.insert(room.id, room);
        Ok(())
    }

    async fn get_room(&self, id: Ulid) -> StoreResult<Option<Room>> {
        Ok(self.rooms.get(&id).map(|e| e.value().clone()))
    }

    async fn get_room_by_name(&self, name: &str) -> StoreResult<Option<Room>> {
        Ok(self
            .rooms
            .iter()
            .find(|e| e.value().name == name)
            .map(|e| e.value().clone()))
    }

    async fn update_room(&self, room: Room) -> StoreResult<()> {
        self.rooms.insert(room.id, room);
        Ok(())
    }

    async fn delete_room(&self, id: Ulid) -> StoreResult<()> {
        self.rooms.remove(&id);
        self.bookings.retain(|_, b| b.room_id != id);
        self.reviews.retain(|_, r| r.room_id != id);
        Ok(())
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        Ok(self.rooms.iter().map(|e| e.value().clone()).collect())
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<()> {
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn get_booking(&self, id: Ulid) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|e| e.value().clone()))
    }

    async fn update_booking(&self, booking: Booking) -> StoreResult<()> {
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn delete_booking(&self, id: Ulid) -> StoreResult<()> {
        self.bookings.remove(&id);
        Ok(())
    }

    async fn bookings_for_room(&self, room_id: Ulid) -> StoreResult<Vec<Booking>> {
        Ok(self
            .bookings
            .iter()
            .filter(|e| e.value().room_id == room_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn bookings_for_user(&self, user_id: Ulid) -> StoreResult<Vec<Booking>> {
        Ok(self
            .bookings
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        Ok(self.bookings.iter().map(|e| e.value().clone()).collect())
    }

    async fn insert_review(&self, review: Review) -> StoreResult<()> {
        self.reviews.insert(review.id, review);
        Ok(())
    }

    async fn get_review(&self, id: Ulid) -> StoreResult<Option<Review>> {
        Ok(self.reviews.get(&id).map(|e| e.value().clone()))
    }

    async fn update_review(&self, review: Review) -> StoreResult<()> {
        self.reviews.insert(review.id, review);
        Ok(())
    }

    async fn reviews_for_room(
        &self,
        room_id: Ulid,
        include_deleted: bool,
    ) -> StoreResult<Vec<Review>> {
        Ok(self
            .reviews
            .iter()
            .filter(|e| e.value().room_id == room_id && (include_deleted || !e.value().deleted))
            .map(|e| e.value().clone())
            .collect())
    }
}
