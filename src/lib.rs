//! Freight Exchange - marketplace de cargas
//!
//! Publicación de jobs, pujas de transportistas, entrega con prueba de
//! entrega (firma y fotos) y facturación con IVA.

pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
