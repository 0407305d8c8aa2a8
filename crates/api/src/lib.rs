pub mod app;
pub mod config;
pub mod domains;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;
