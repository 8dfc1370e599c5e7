//! Persistence adapter: record models, repository traits, and the in-memory
//! store used by the server and the tests.

pub mod db;
pub mod error;
pub mod model;
