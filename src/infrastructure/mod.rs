pub mod config;
pub mod locking;
pub mod logging;
pub mod pg_repository;
pub mod repository;
pub mod shutdown;

pub use config::{AppConfig, StorageBackend};
pub use locking::{AccountLockGuard, AccountLocks};
pub use pg_repository::PgAccountRepository;
pub use repository::{AccountRepositoryTrait, InMemoryAccountRepository, RepositoryError};
