//! Cache coordinator and its builder

mod builder;
mod coordinator;

pub use builder::CacheCoordinatorBuilder;
pub use coordinator::{CacheCoordinator, DEFAULT_TTL};
