pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod staff_repo;
pub use staff_repo::StaffRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod schedule_repo;
pub use schedule_repo::ScheduleRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
