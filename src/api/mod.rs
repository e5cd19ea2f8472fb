//! HTTP layer: JSON API, HTML question form and health probes

pub mod health;
pub mod router;
pub mod state;
pub mod types;
pub mod ui;
pub mod v1;

pub use router::create_router;
pub use state::AppState;
