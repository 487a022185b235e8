//! Cache
//!
//! Redis opcional (REDIS_URL) para snapshots de la bolsa de cargas.

pub mod cache_config;
pub mod job_board_cache;
pub mod redis_client;

pub use cache_config::{CacheConfig, CacheOperations};
pub use job_board_cache::JobBoardCache;
pub use redis_client::RedisClient;
