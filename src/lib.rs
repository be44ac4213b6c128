pub mod engine;
pub mod journal;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod policy;
pub mod reaper;
pub mod revocation;

pub use engine::{Engine, EngineError};
