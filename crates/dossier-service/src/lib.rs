//! Use cases behind the HTTP surface: recurring events, intake
//! classification, and bearer-token authorization.

pub mod auth;
pub mod error;
pub mod intake;
pub mod recurring;
