//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod appointment_repo;
pub mod availability_repo;
pub mod user_repo;

pub use appointment_repo::AppointmentRepo;
pub use availability_repo::AvailabilityRepo;
pub use user_repo::UserRepo;
