pub mod account_service;

pub use account_service::{AccountService, AccountServiceTrait, MAX_ACCOUNT_NUMBER_ATTEMPTS};
