//! In-process store backing both repositories.
//!
//! ## Summary
//! All tables live behind one `tokio::sync::RwLock`. A change list is applied
//! to a copy of the tables and swapped in only if every change succeeded, so
//! readers never observe half of a series mutation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use dossier_core::util::text::{jaccard, word_set};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{BoxFuture, IntakeRepository, SeriesRepository};
use crate::error::{DbError, DbResult};
use crate::model::intake::{
    ClassificationFeedback, ClassificationPattern, IntakeTicket, SimilarTicket, StoredPrediction,
};
use crate::model::series::{CalendarEntry, Series, SeriesAggregate, SeriesChange, SeriesException};

#[derive(Debug, Clone, Default)]
struct Tables {
    series: HashMap<Uuid, Series>,
    entries: HashMap<Uuid, CalendarEntry>,
    /// Keyed by `(series_id, exception_date)`: one exception per date.
    exceptions: BTreeMap<(Uuid, NaiveDate), SeriesException>,
    tickets: HashMap<Uuid, IntakeTicket>,
    patterns: Vec<ClassificationPattern>,
    predictions: HashMap<Uuid, StoredPrediction>,
    feedback: Vec<ClassificationFeedback>,
}

impl Tables {
    /// Bump the series version if it still is `expected`.
    fn claim(&mut self, id: Uuid, expected: i64) -> DbResult<i64> {
        let current = self
            .series
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("series {id}")))?;
        if current.version != expected {
            return Err(DbError::Conflict(format!(
                "series {id} is at version {}, change was planned against {expected}",
                current.version
            )));
        }
        current.version += 1;
        Ok(current.version)
    }

    fn apply(&mut self, change: SeriesChange) -> DbResult<()> {
        match change {
            SeriesChange::InsertSeries { series, master } => {
                if self.series.contains_key(&series.id) {
                    return Err(DbError::Conflict(format!("series {} already exists", series.id)));
                }
                self.entries.insert(master.id, master);
                self.series.insert(series.id, series);
            }
            SeriesChange::UpdateSeries(mut series) => {
                series.version = self.claim(series.id, series.version)?;
                self.series.insert(series.id, series);
            }
            SeriesChange::ClaimVersion { id, expected } => {
                self.claim(id, expected)?;
            }
            SeriesChange::UpdateEntry(entry) => {
                if !self.entries.contains_key(&entry.id) {
                    return Err(DbError::NotFound(format!("calendar entry {}", entry.id)));
                }
                self.entries.insert(entry.id, entry);
            }
            SeriesChange::DeleteSeries(id) => {
                let series = self
                    .series
                    .remove(&id)
                    .ok_or_else(|| DbError::NotFound(format!("series {id}")))?;
                self.entries.remove(&series.master_entry_id);
                self.entries.retain(|_, entry| entry.series_id != Some(id));
                self.exceptions.retain(|(series_id, _), _| *series_id != id);
            }
            SeriesChange::UpsertException {
                exception,
                replacement,
            } => {
                if !self.series.contains_key(&exception.series_id) {
                    return Err(DbError::NotFound(format!("series {}", exception.series_id)));
                }
                let key = (exception.series_id, exception.exception_date);
                if let Some(previous) = self.exceptions.get(&key)
                    && let Some(old_replacement) = previous.replacement_entry_id
                    && exception.replacement_entry_id != Some(old_replacement)
                {
                    self.entries.remove(&old_replacement);
                }
                if let Some(entry) = replacement {
                    self.entries.insert(entry.id, entry);
                }
                self.exceptions.insert(key, exception);
            }
            SeriesChange::DeleteException { series_id, date } => {
                let removed = self.exceptions.remove(&(series_id, date)).ok_or_else(|| {
                    DbError::NotFound(format!("exception on {date} for series {series_id}"))
                })?;
                if let Some(replacement) = removed.replacement_entry_id {
                    self.entries.remove(&replacement);
                }
            }
            SeriesChange::MoveException { from, to, date } => {
                if !self.series.contains_key(&to) {
                    return Err(DbError::NotFound(format!("series {to}")));
                }
                let mut exception = self.exceptions.remove(&(from, date)).ok_or_else(|| {
                    DbError::NotFound(format!("exception on {date} for series {from}"))
                })?;
                exception.series_id = to;
                if let Some(entry) = exception
                    .replacement_entry_id
                    .and_then(|id| self.entries.get_mut(&id))
                {
                    entry.series_id = Some(to);
                }
                self.exceptions.insert((to, date), exception);
            }
        }
        Ok(())
    }

    fn aggregate(&self, id: Uuid) -> DbResult<Option<SeriesAggregate>> {
        let Some(series) = self.series.get(&id) else {
            return Ok(None);
        };
        let master = self
            .entries
            .get(&series.master_entry_id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("master entry of series {id}")))?;
        let exceptions: Vec<SeriesException> = self
            .exceptions
            .range((id, NaiveDate::MIN)..=(id, NaiveDate::MAX))
            .map(|(_, exception)| exception.clone())
            .collect();
        let replacements = exceptions
            .iter()
            .filter_map(|e| e.replacement_entry_id)
            .filter_map(|entry_id| self.entries.get(&entry_id).cloned())
            .collect();

        Ok(Some(SeriesAggregate {
            series: series.clone(),
            master,
            exceptions,
            replacements,
        }))
    }
}

/// Shared, cloneable handle to the in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with classification patterns.
    #[must_use]
    pub fn with_patterns(patterns: Vec<ClassificationPattern>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                patterns,
                ..Tables::default()
            })),
        }
    }

    /// Number of feedback records, for diagnostics and tests.
    pub async fn feedback_count(&self) -> usize {
        self.tables.read().await.feedback.len()
    }
}

impl SeriesRepository for MemoryStore {
    fn get_series(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<SeriesAggregate>>> {
        Box::pin(async move { self.tables.read().await.aggregate(id) })
    }

    #[tracing::instrument(skip(self, changes), fields(change_count = changes.len()))]
    fn apply_changes(&self, changes: Vec<SeriesChange>) -> BoxFuture<'_, DbResult<()>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let mut staged = tables.clone();
            for change in changes {
                staged.apply(change)?;
            }
            *tables = staged;
            tracing::debug!("Series changes committed");
            Ok(())
        })
    }
}

impl IntakeRepository for MemoryStore {
    fn insert_ticket(&self, ticket: IntakeTicket) -> BoxFuture<'_, DbResult<()>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            if tables.tickets.contains_key(&ticket.id) {
                return Err(DbError::Conflict(format!("ticket {} already exists", ticket.id)));
            }
            tables.tickets.insert(ticket.id, ticket);
            Ok(())
        })
    }

    fn get_ticket(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<IntakeTicket>>> {
        Box::pin(async move { Ok(self.tables.read().await.tickets.get(&id).cloned()) })
    }

    fn active_patterns(&self) -> BoxFuture<'_, DbResult<Vec<ClassificationPattern>>> {
        Box::pin(async move {
            Ok(self
                .tables
                .read()
                .await
                .patterns
                .iter()
                .filter(|pattern| pattern.is_active)
                .cloned()
                .collect())
        })
    }

    fn find_similar<'a>(
        &'a self,
        exclude: Uuid,
        text: &'a str,
        threshold: f64,
        limit: usize,
    ) -> BoxFuture<'a, DbResult<Vec<SimilarTicket>>> {
        Box::pin(async move {
            let words = word_set(text);
            let tables = self.tables.read().await;
            let mut similar: Vec<SimilarTicket> = tables
                .tickets
                .values()
                .filter(|ticket| ticket.id != exclude)
                .filter_map(|ticket| {
                    let classification = ticket.final_classification?;
                    let similarity = jaccard(&words, &word_set(&ticket.combined_text()));
                    (similarity >= threshold).then_some(SimilarTicket {
                        ticket_id: ticket.id,
                        similarity,
                        classification,
                    })
                })
                .collect();
            similar.sort_by(|a, b| {
                b.similarity
                    .total_cmp(&a.similarity)
                    .then_with(|| a.ticket_id.cmp(&b.ticket_id))
            });
            similar.truncate(limit);
            Ok(similar)
        })
    }

    fn latest_prediction(&self, ticket_id: Uuid) -> BoxFuture<'_, DbResult<Option<StoredPrediction>>> {
        Box::pin(async move {
            Ok(self
                .tables
                .read()
                .await
                .predictions
                .values()
                .filter(|prediction| prediction.ticket_id == ticket_id)
                .max_by_key(|prediction| prediction.created_at)
                .cloned())
        })
    }

    fn get_prediction(&self, id: Uuid) -> BoxFuture<'_, DbResult<Option<StoredPrediction>>> {
        Box::pin(async move { Ok(self.tables.read().await.predictions.get(&id).cloned()) })
    }

    fn insert_prediction(&self, prediction: StoredPrediction) -> BoxFuture<'_, DbResult<()>> {
        Box::pin(async move {
            self.tables
                .write()
                .await
                .predictions
                .insert(prediction.id, prediction);
            Ok(())
        })
    }

    fn record_feedback(&self, feedback: ClassificationFeedback) -> BoxFuture<'_, DbResult<()>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let ticket = tables
                .tickets
                .get_mut(&feedback.ticket_id)
                .ok_or_else(|| DbError::NotFound(format!("ticket {}", feedback.ticket_id)))?;
            ticket.final_classification = Some(feedback.final_values);
            tables.feedback.push(feedback);
            Ok(())
        })
    }
}
