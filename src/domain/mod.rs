pub mod account;
pub mod commands;

pub use account::*;
pub use commands::*;

pub use account::AccountError;
