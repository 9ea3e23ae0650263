use tracing::debug;
use ulid::Ulid;

use crate::model::{Actor, Room, RoomFilter, RoomPatch};

use super::{policy, Engine, EngineError, Entity};

impl Engine {
    /// Create a room. Admin or facility manager; names are unique.
    pub async fn create_room(
        &self,
        actor: &Actor,
        name: String,
        capacity: u32,
        equipment: Option<String>,
        location: String,
    ) -> Result<Room, EngineError> {
        policy::require_room_manager(actor)?;
        if self.store.get_room_by_name(&name).await?.is_some() {
            return Err(EngineError::AlreadyExists("room name already exists"));
        }

        let room = Room {
            id: Ulid::new(),
            name,
            capacity,
            equipment,
            location,
            is_available: true,
        };
        self.store.insert_room(room.clone()).await?;
        debug!(room = %room.id, name = %room.name, "room created");
        Ok(room)
    }

    /// Partial update. Admin or facility manager.
    pub async fn update_room(
        &self,
        actor: &Actor,
        room_id: Ulid,
        patch: RoomPatch,
    ) -> Result<Room, EngineError> {
        policy::require_room_manager(actor)?;
        let mut room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Room))?;

        if let Some(name) = patch.name {
            room.name = name;
        }
        if let Some(capacity) = patch.capacity {
            room.capacity = capacity;
        }
        if let Some(equipment) = patch.equipment {
            room.equipment = Some(equipment);
        }
        if let Some(location) = patch.location {
            room.location = location;
        }
        if let Some(is_available) = patch.is_available {
            room.is_available = is_available;
        }

        self.store.update_room(room.clone()).await?;
        Ok(room)
    }

    /// Delete a room. Admin or facility manager; the repository cascades to
    /// the room's bookings and reviews.
    pub async fn delete_room(&self, actor: &Actor, room_id: Ulid) -> Result<(), EngineError> {
        policy::require_room_manager(actor)?;
        if self.store.get_room(room_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Room));
        }
        self.store.delete_room(room_id).await?;
        self.drop_room_lock(&room_id);
        debug!(room = %room_id, "room deleted");
        Ok(())
    }

    /// Public room lookup.
    pub async fn get_room(&self, room_id: Ulid) -> Result<Room, EngineError> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Room))
    }

    /// Public listing with conjunctive filters.
    pub async fn list_rooms(&self, filter: &RoomFilter) -> Result<Vec<Room>, EngineError> {
        let mut rooms = self.store.list_rooms().await?;
        rooms.retain(|room| {
            filter.min_capacity.is_none_or(|min| room.capacity >= min)
                && filter
                    .location
                    .as_deref()
                    .is_none_or(|loc| room.location == loc)
                && filter.equipment_contains.as_deref().is_none_or(|needle| {
                    room.equipment
                        .as_deref()
                        .is_some_and(|eq| eq.contains(needle))
                })
                && (!filter.only_available || room.is_available)
        });
        Ok(rooms)
    }
}
