//! Controllers
//!
//! Traducen entre DTOs y servicios. Se construyen por request a partir del
//! `AppState`; sin backing store la construcción falla con `NotConfigured`.

pub mod analytics_controller;
pub mod auth_controller;
pub mod bid_controller;
pub mod delivery_controller;
pub mod fleet_controller;
pub mod invoice_controller;
pub mod job_controller;
