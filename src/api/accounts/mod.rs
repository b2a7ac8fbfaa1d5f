pub mod forms;
pub mod handlers;

pub use handlers::accounts_config;
