//! HTTP shell for the recurring-events and intake-classification services.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod store_handler;
