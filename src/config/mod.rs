//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y las constantes de negocio.

pub mod business;
pub mod database;
pub mod environment;

pub use environment::*;
