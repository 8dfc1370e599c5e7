//! Shared configuration, errors, and utilities for the dossier workspace.

pub mod bilingual;
pub mod config;
pub mod constants;
pub mod error;
pub mod util;

pub use bilingual::Bilingual;
