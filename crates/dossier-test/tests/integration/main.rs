//! HTTP-level tests against the assembled service.

mod auth;
mod helpers;
mod intake;
mod recurring_events;
