pub mod app;
pub mod clock;
pub mod config;
pub mod days;
pub mod errors;
pub mod github;
pub mod handlers;
pub mod memory_store;
pub mod models;
pub mod overview;
pub mod progress;
pub mod state;
pub mod storage;
pub mod ui;
pub mod unlock;

pub use app::router;
pub use config::Config;
pub use progress::ProgressService;
pub use state::AppState;
pub use storage::{DocumentClient, DocumentStore};
