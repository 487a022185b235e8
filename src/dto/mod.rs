//! DTOs de la API
//!
//! Cuerpos de request/response. La validación de formato vive aquí
//! (`validator`); las reglas de negocio, en los servicios.

pub mod api_response;
pub mod auth_dto;
pub mod bid_dto;
pub mod delivery_dto;
pub mod fleet_dto;
pub mod invoice_dto;
pub mod job_dto;

pub use api_response::ApiResponse;
