//! Modelos del sistema
//!
//! Este módulo contiene los modelos de dominio. Las filas de PostgreSQL se
//! convierten a estos tipos en los repositorios.

pub mod analytics;
pub mod auth;
pub mod bid;
pub mod company;
pub mod document;
pub mod driver;
pub mod invoice;
pub mod job;
pub mod profile;
pub mod vehicle;
