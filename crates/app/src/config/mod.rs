//! Configuration
//!
//! Settings are `clap` argument groups with environment fallbacks so that
//! binaries can flatten the groups they need.

mod db;
mod logging;
mod orders;

pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use orders::OrdersConfig;
