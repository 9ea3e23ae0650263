pub mod auth;
pub mod breaker;
pub mod engine;
pub mod model;
pub mod observability;

pub use breaker::{BreakerState, CircuitBreaker};
pub use engine::{Engine, EngineError, Entity, MemoryStore, Repository};
