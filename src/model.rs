use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// Half-open interval `[start, end)`.
///
/// The caller supplies `start < end`; the type does not enforce ordering and
/// every operation tolerates degenerate spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// The single source of truth for conflict detection. Spans that touch
    /// at a boundary (`self.end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }
}

/// The three account roles. Policy decisions always match on this enum,
/// never on role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    FacilityManager,
    Regular,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::FacilityManager => "facility_manager",
            Role::Regular => "regular",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "facility_manager" => Some(Role::FacilityManager),
            "regular" => Some(Role::Regular),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved caller identity every engine operation runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Ulid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Ulid, role: Role) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Ulid,
    pub name: String,
    pub username: String,
    pub email: String,
    /// Opaque credential. Hashing happens behind the Authenticator seam.
    pub password_hash: String,
    pub role: Role,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Registration input. Username and email must be unique across users.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Ulid,
    pub name: String,
    pub capacity: u32,
    pub equipment: Option<String>,
    pub location: String,
    /// Administrative availability flag. Independent of schedule occupancy.
    pub is_available: bool,
}

/// An exclusive-intent reservation of a room for `[start, end)`.
/// `end > start` is a caller obligation and is not re-validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub user_id: Ulid,
    pub room_id: Ulid,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Ulid,
    pub user_id: Ulid,
    pub room_id: Ulid,
    /// 1–5 expected but not range-checked.
    pub rating: i32,
    pub comment: Option<String>,
    /// Moderation marker. Flagged reviews stay publicly listed.
    pub flagged: bool,
    /// Soft-delete marker. Deleted reviews are hidden and immutable until restored.
    pub deleted: bool,
}

// ── Partial-update inputs ────────────────────────────────────────
// `None` fields are left unchanged.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub equipment: Option<String>,
    pub location: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Room listing filters. All criteria are conjunctive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomFilter {
    pub min_capacity: Option<u32>,
    pub location: Option<String>,
    pub equipment_contains: Option<String>,
    pub only_available: bool,
}
