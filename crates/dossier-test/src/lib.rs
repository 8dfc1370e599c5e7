//! Dossier server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can reach
//! every layer through `dossier_test::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    pub use dossier_core::*;
    pub use dossier_service::*;

    pub mod db {
        pub use dossier_db::db::*;

        pub mod store {
            pub use dossier_app::store_handler::StoreHandler;
            pub use dossier_db::db::memory::MemoryStore;
        }
    }

    pub mod model {
        pub use dossier_db::model::*;
    }

    pub mod middleware {
        pub use dossier_app::middleware::*;
    }

    pub mod config {
        pub use dossier_app::config::ConfigHandler;
        pub use dossier_core::config::*;
    }
}

pub mod app {
    pub use dossier_app::*;

    pub mod api {
        pub use dossier_app::app::api::*;
    }
}

pub use dossier_recurrence as recurrence;
