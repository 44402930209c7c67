//! HTTP API handlers for caseflow-tickets

pub mod health;
pub mod tickets;

pub use health::health_routes;
pub use tickets::ticket_routes;
