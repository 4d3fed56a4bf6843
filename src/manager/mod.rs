pub mod token_manager;

pub use token_manager::{ManagerSettings, TokenManager};
