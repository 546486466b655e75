pub mod appointments;
pub mod auth;
pub mod calendar;
pub mod catalog;
pub mod clients;
pub mod dashboard;
pub mod inventory;
pub mod products;
pub mod schedule;
pub mod staff;
