//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los servicios
//! son los únicos que llaman a los repositorios; los controllers solo
//! traducen entre DTOs y servicios.

pub mod access_policy;
pub mod analytics_service;
pub mod auth_service;
pub mod bid_service;
pub mod chat_link;
pub mod delivery_service;
pub mod export_service;
pub mod fleet_service;
pub mod invoice_service;
pub mod job_query;
pub mod job_service;
pub mod jwt_service;
pub mod session;

pub use access_policy::{can_access, View};
pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use bid_service::BidService;
pub use delivery_service::DeliveryService;
pub use fleet_service::FleetService;
pub use invoice_service::InvoiceService;
pub use job_query::JobQuery;
pub use job_service::JobService;
pub use jwt_service::JwtService;
pub use session::{SessionEvent, SessionRegistry};
