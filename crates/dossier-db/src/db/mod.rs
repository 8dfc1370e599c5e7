//! Repository traits and their in-memory implementation.
//!
//! Traits return boxed futures so the HTTP layer can hold them as
//! `Arc<dyn SeriesRepository + Send + Sync>` in the request depot.

use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use crate::error::DbResult;
use crate::model::intake::{
    ClassificationFeedback, ClassificationPattern, IntakeTicket, SimilarTicket, StoredPrediction,
};
use crate::model::series::{SeriesAggregate, SeriesChange};

pub mod enums;
pub mod memory;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SeriesRepository: Send + Sync {
    /// Series with its master entry, exceptions, and replacement entries.
    fn get_series(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<SeriesAggregate>>>;

    /// Apply every change or none of them.
    fn apply_changes(&self, changes: Vec<SeriesChange>) -> BoxFuture<'_, DbResult<()>>;
}

pub trait IntakeRepository: Send + Sync {
    fn insert_ticket(&self, ticket: IntakeTicket) -> BoxFuture<'_, DbResult<()>>;

    fn get_ticket(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<IntakeTicket>>>;

    fn active_patterns(&self) -> BoxFuture<'_, DbResult<Vec<ClassificationPattern>>>;

    /// Classified tickets whose text resembles `text`, most similar first.
    fn find_similar<'a>(
        &'a self,
        exclude: Uuid,
        text: &'a str,
        threshold: f64,
        limit: usize,
    ) -> BoxFuture<'a, DbResult<Vec<SimilarTicket>>>;

    fn latest_prediction(&self, ticket_id: Uuid) -> BoxFuture<'_, DbResult<Option<StoredPrediction>>>;

    fn get_prediction(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<StoredPrediction>>>;

    fn insert_prediction(&self, prediction: StoredPrediction) -> BoxFuture<'_, DbResult<()>>;

    /// Store feedback and record its final values on the ticket.
    fn record_feedback(&self, feedback: ClassificationFeedback) -> BoxFuture<'_, DbResult<()>>;
}
