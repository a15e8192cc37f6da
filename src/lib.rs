pub mod api;
pub mod app;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod ui;
pub mod state;

pub use api::BackendClient;
pub use app::router;
pub use config::Config;
pub use state::AppState;
