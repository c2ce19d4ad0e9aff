//! Persistence for learner profiles

pub mod error;
pub mod file_repository;
pub mod in_memory_repository;
pub mod postgres_repository;
pub mod repository;

pub use error::{ProfileError, ProfileResult};
pub use file_repository::FileProfileRepository;
pub use in_memory_repository::InMemoryProfileRepository;
pub use postgres_repository::PostgresProfileRepository;
pub use repository::ProfileRepository;
