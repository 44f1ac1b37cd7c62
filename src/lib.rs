pub mod aggregate;
pub mod app;
pub mod charts;
pub mod client;
pub mod config;
pub mod errors;
pub mod gauge;
pub mod handlers;
pub mod models;
pub mod state;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use view::Dashboard;
