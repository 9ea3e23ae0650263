use ulid::Ulid;

/// Entity kind for not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Room,
    Booking,
    Review,
}

impl Entity {
    fn label(&self) -> &'static str {
        match self {
            Entity::User => "user",
            Entity::Room => "room",
            Entity::Booking => "booking",
            Entity::Review => "review",
        }
    }
}

/// Terminal outcomes surfaced to the caller. Each variant maps to a distinct
/// stable signal so clients can tell "pick another time" (`Conflict`) from
/// "try again later" (`CircuitOpen`) from "not allowed" (`Forbidden`).
#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    NotFound(Entity),
    AlreadyExists(&'static str),
    Forbidden(&'static str),
    /// Scheduling overlap; carries the id of the conflicting booking.
    Conflict(Ulid),
    BadRequest(&'static str),
    Unauthorized,
    /// Rejected fast by the write gateway while the breaker is open.
    CircuitOpen,
    /// Downstream failure while the breaker was still closed or half-open.
    Internal(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(entity) => write!(f, "{} not found", entity.label()),
            EngineError::AlreadyExists(msg) => write!(f, "{msg}"),
            EngineError::Forbidden(msg) => write!(f, "{msg}"),
            EngineError::Conflict(id) => {
                write!(f, "room already booked for that time range (conflicts with {id})")
            }
            EngineError::BadRequest(msg) => write!(f, "{msg}"),
            EngineError::Unauthorized => write!(f, "could not validate credentials"),
            EngineError::CircuitOpen => {
                write!(f, "booking service temporarily unavailable (circuit open)")
            }
            EngineError::Internal(e) => write!(f, "downstream failure: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
