//! Request handlers

pub mod health;
pub mod mode;
pub mod scrape;

pub use health::{daemon_status, health_check};
pub use mode::{get_mode, set_mode};
pub use scrape::metrics;
