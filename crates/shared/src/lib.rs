//! Storeflow shared plumbing
//!
//! Connection construction shared across the API server and operator tooling.

pub mod cache;
pub mod db;

pub use cache::connect_redis;
pub use db::create_pool;
