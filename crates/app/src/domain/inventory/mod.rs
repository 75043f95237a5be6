//! Inventory
//!
//! Stock counts only change through this module. Every mutation is a single
//! conditional `UPDATE`, so the row lock taken by `PostgreSQL` is the critical
//! section and concurrent reservations can never drive stock below zero.

pub mod errors;
mod repository;
pub mod service;

pub(crate) use repository::PgInventoryRepository;

pub use errors::InventoryError;
pub use service::*;
