pub mod app;
pub mod coach;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod sheet;
pub mod state;
pub mod stats;
pub mod storage;
pub mod transfer;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::Store;
