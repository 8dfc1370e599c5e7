//! Recurring-events use cases.
//!
//! ## Summary
//! Each operation loads a series aggregate, runs the pure recurrence engine
//! over it, and hands the resulting changes to the repository as one unit.
//! Reference time is always passed in by the caller.

pub mod edit;
pub mod entry;
pub mod series;
pub mod types;

use dossier_core::bilingual;
use dossier_db::db::SeriesRepository;
use dossier_db::model::series::SeriesAggregate;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

pub use edit::{add_exception, delete_series, remove_exception, update_series};
pub use series::{create_series, export_rrule, list_occurrences};

/// ## Errors
/// Returns `NotFound` if no series has this id.
pub(crate) async fn load_series(repo: &dyn SeriesRepository, id: Uuid) -> ServiceResult<SeriesAggregate> {
    repo.get_series(id).await?.ok_or_else(|| {
        ServiceError::NotFound(bilingual!(
            "Series {} not found",
            "السلسلة {} غير موجودة",
            id
        ))
    })
}
