//! Orders
//!
//! Checkout turns a cart into an immutable order snapshot; the lifecycle
//! then only moves the order's status (and returns stock on cancellation).

pub mod data;
pub mod errors;
pub mod models;
pub mod number;
pub mod records;
mod repositories;
pub mod service;
pub mod status;

pub use errors::OrdersServiceError;
pub use service::*;
