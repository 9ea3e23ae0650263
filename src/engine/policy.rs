//! The role-authorization matrix. Every decision is an explicit match over
//! [`Role`]; denials carry a stable reason and are never downgraded to a
//! narrower result scope.

use ulid::Ulid;

use crate::model::{Actor, Role};
use crate::observability;

use super::EngineError;

fn deny(reason: &'static str) -> EngineError {
    metrics::counter!(observability::AUTH_DENIALS_TOTAL).increment(1);
    EngineError::Forbidden(reason)
}

/// Admin-only operations: review restore/flag/unflag, user listing and
/// lookup, user deletion, password reset, booking-history inspection.
pub(super) fn require_admin(actor: &Actor, denial: &'static str) -> Result<(), EngineError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::FacilityManager | Role::Regular => Err(deny(denial)),
    }
}

/// Room create/update/delete: admin or facility manager.
pub(super) fn require_room_manager(actor: &Actor) -> Result<(), EngineError> {
    match actor.role {
        Role::Admin | Role::FacilityManager => Ok(()),
        Role::Regular => Err(deny("not enough permissions")),
    }
}

/// Booking update/cancel and review update/soft-delete: the resource owner,
/// or an admin overriding the ownership check.
pub(super) fn require_owner_or_admin(
    actor: &Actor,
    owner: Ulid,
    denial: &'static str,
) -> Result<(), EngineError> {
    if actor.id == owner {
        return Ok(());
    }
    require_admin(actor, denial)
}

/// Admin and facility managers list every booking; everyone else only their
/// own.
pub(super) fn sees_all_bookings(role: Role) -> bool {
    match role {
        Role::Admin | Role::FacilityManager => true,
        Role::Regular => false,
    }
}

/// Only admins may touch the role field, even on their own profile.
pub(super) fn may_change_role(actor: &Actor) -> bool {
    matches!(actor.role, Role::Admin)
}

/// Admins bypass the overlap scan on booking create/update.
pub(super) fn overrides_conflicts(actor: &Actor) -> bool {
    matches!(actor.role, Role::Admin)
}
