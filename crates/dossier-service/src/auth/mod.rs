//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `authenticate`: bearer-token lookup against the configured token digests
//! - `casbin`: enforcer initialization and depot integration
//! - `depot`: helpers for reading the authenticated principal from a request
//! - `service`: the `Authorizer` wrapping Casbin enforcement

pub mod authenticate;
pub mod casbin;
pub mod depot;
pub mod service;

use std::fmt;

pub use authenticate::{Principal, authenticate_bearer, token_digest};
pub use service::{Authorizer, authorizer_from_depot};

/// What a request touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Series,
    Classification,
    Feedback,
    Tickets,
}

impl Resource {
    #[must_use]
    pub const fn as_casbin_object(self) -> &'static str {
        match self {
            Self::Series => "series",
            Self::Classification => "classification",
            Self::Feedback => "feedback",
            Self::Tickets => "tickets",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_casbin_object())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    #[must_use]
    pub const fn as_casbin_action(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_casbin_action())
    }
}
