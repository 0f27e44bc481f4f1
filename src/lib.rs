pub mod alerts;
pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod forms;
pub mod models;
pub mod resource;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod table;

pub use config::ClientConfig;
pub use error::AppError;
pub use state::AppContext;
