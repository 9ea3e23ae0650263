mod bookings;
mod conflict;
mod error;
mod policy;
mod reviews;
mod rooms;
mod store;
mod users;

pub use error::{EngineError, Entity};
pub use store::{MemoryStore, Repository, StoreError, StoreResult};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::breaker::CircuitBreaker;

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Internal(e.0)
    }
}

/// The booking core. HTTP routing, token mechanics, and durable storage live
/// behind the seams this struct holds; every operation takes a resolved
/// [`Actor`](crate::model::Actor) where authorization applies.
pub struct Engine {
    store: Arc<dyn Repository>,
    breaker: Arc<CircuitBreaker>,
    /// One mutex per room. The overlap scan and the commit of a booking
    /// create must not interleave with another create for the same room.
    room_locks: DashMap<Ulid, Arc<Mutex<()>>>,
}

impl Engine {
    pub fn new(store: Arc<dyn Repository>, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            store,
            breaker,
            room_locks: DashMap::new(),
        }
    }

    /// Engine over the bundled in-memory store with default breaker settings.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(CircuitBreaker::default()),
        )
    }

    /// Current write-gateway state, for observability and tests.
    pub fn breaker_state(&self) -> crate::breaker::BreakerState {
        self.breaker.state()
    }

    pub(super) fn room_lock(&self, room_id: Ulid) -> Arc<Mutex<()>> {
        self.room_locks.entry(room_id).or_default().value().clone()
    }

    pub(super) fn drop_room_lock(&self, room_id: &Ulid) {
        self.room_locks.remove(room_id);
    }
}
