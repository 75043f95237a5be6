//! Storefront cart, inventory and order services.

pub mod clock;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod identity;
pub mod logging;

#[cfg(test)]
mod test;

mod uuids;
