pub mod appointment_service;
pub mod auth;
pub mod calendar_service;
pub mod catalog_service;
pub mod client_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod schedule_service;
pub mod staff_service;
