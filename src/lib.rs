pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod web;

// Re-export commonly used types
pub use application::{AccountService, AccountServiceTrait};
pub use domain::{Account, AccountError};
pub use infrastructure::repository::AccountRepositoryTrait;
pub use infrastructure::{AppConfig, InMemoryAccountRepository, PgAccountRepository};
pub use web::create_router;
