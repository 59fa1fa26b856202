//! Remote service clients.

pub mod shotgun;

pub use shotgun::ShotgunClient;
