use ulid::Ulid;

use crate::model::{Booking, Span};

use super::EngineError;

/// Scan a room's bookings for an interval overlap against `span`.
///
/// `exclude` skips one booking by identity — an update checking the new slot
/// must not collide with its own prior slot. The first conflicting booking
/// id is reported. Input order does not matter.
pub(super) fn check_no_conflict(
    existing: &[Booking],
    span: &Span,
    exclude: Option<Ulid>,
) -> Result<(), EngineError> {
    for b in existing {
        if exclude == Some(b.id) {
            continue;
        }
        if b.span.overlaps(span) {
            return Err(EngineError::Conflict(b.id));
        }
    }
    Ok(())
}
