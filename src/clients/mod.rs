//! Clients - clientes HTTP hacia servicios externos

pub mod storage_client;

pub use storage_client::{HttpObjectStorage, MemoryPhotoStorage, PhotoStorage};
