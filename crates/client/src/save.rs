//! Executes a timetable save against the backend.
//!
//! The plan from [`plan_save`] runs in two phases: every deletion completes
//! before the first upsert, and upserts are sent one at a time in grid
//! order. The first failure stops the save; requests already applied are
//! not rolled back, and only cells confirmed by the backend are committed
//! to the grid's snapshot.
//!
//! A POST may succeed without reporting the row's id. Those ids are looked
//! up once after the upsert pass so a later clear can delete the row.

use schoolgrid_core::error::CoreError;
use schoolgrid_core::grid::{GridError, GridState};
use schoolgrid_core::reconcile::{plan_save, CellDeletion, CellUpsert, SaveOptions};
use schoolgrid_core::types::{DbId, Day};
use schoolgrid_core::week_fill::Prompter;

use crate::api::{ApiError, TimetableApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No cell is occupied any more; only deletions were needed.
    Cleared { deleted: usize },
    /// Rows were written (possibly none, if nothing changed).
    Saved { deleted: usize, upserted: usize },
}

impl SaveOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Cleared { .. } => "Timetable cleared successfully.".to_string(),
            Self::Saved { upserted: 0, deleted: 0 } => "No changes to save.".to_string(),
            Self::Saved { upserted, deleted } => {
                format!("Timetable saved ({upserted} periods updated, {deleted} removed).")
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Could not delete record {record_id} ({day} period {period_id}): {source}")]
    DeleteFailed {
        day: Day,
        period_id: DbId,
        record_id: DbId,
        source: ApiError,
    },

    #[error("Could not save {day} period {period_id}: {source}")]
    UpsertFailed {
        day: Day,
        period_id: DbId,
        source: ApiError,
    },

    #[error("Duplicate assignment on {day} period {period_id} was not confirmed: {message}")]
    DuplicateDeclined {
        day: Day,
        period_id: DbId,
        message: String,
    },
}

impl SaveError {
    /// Text suitable for showing to the person editing the timetable.
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(CoreError::Validation(msg)) => msg.clone(),
            Self::DeleteFailed { source, .. } | Self::UpsertFailed { source, .. } => {
                source.user_message()
            }
            Self::DuplicateDeclined { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub struct SaveReconciler<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A> SaveReconciler<'a, A>
where
    A: TimetableApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Plan and apply a save, committing confirmed cells to `grid`.
    pub async fn save<P>(
        &self,
        grid: &mut GridState,
        options: &SaveOptions,
        prompter: &P,
    ) -> Result<SaveOutcome, SaveError>
    where
        P: Prompter + ?Sized,
    {
        let plan = plan_save(grid, options)?;
        tracing::info!(
            context = %options.context,
            deletes = plan.delete_request_count(),
            upserts = plan.upserts.len(),
            effect_from = %options.effect_from,
            published = options.published,
            "Saving timetable",
        );

        let deleted = self.apply_deletions(grid, &plan.deletions).await?;

        if plan.clears_everything() {
            tracing::info!(deleted, "Timetable cleared");
            return Ok(SaveOutcome::Cleared { deleted });
        }

        let upserted = self.apply_upserts(grid, &plan.upserts, prompter).await?;
        self.resolve_missing_ids(grid, options).await;
        tracing::info!(deleted, upserted, "Timetable saved");
        Ok(SaveOutcome::Saved { deleted, upserted })
    }

    /// Delete every persisted row of every cleared cell. Returns the number
    /// of DELETE requests that succeeded.
    async fn apply_deletions(
        &self,
        grid: &mut GridState,
        deletions: &[CellDeletion],
    ) -> Result<usize, SaveError> {
        let mut deleted = 0;
        for cell in deletions {
            for &record_id in &cell.record_ids {
                if let Err(source) = self.api.delete_assignment(record_id).await {
                    tracing::error!(
                        day = %cell.day,
                        period_id = cell.period_id,
                        record_id,
                        error = %source,
                        "Delete failed, aborting save",
                    );
                    return Err(SaveError::DeleteFailed {
                        day: cell.day,
                        period_id: cell.period_id,
                        record_id,
                        source,
                    });
                }
                deleted += 1;
            }
            grid.commit_deleted(cell.day, cell.period_id)?;
        }
        Ok(deleted)
    }

    /// Send upserts sequentially, committing each cell once confirmed.
    async fn apply_upserts<P>(
        &self,
        grid: &mut GridState,
        upserts: &[CellUpsert],
        prompter: &P,
    ) -> Result<usize, SaveError>
    where
        P: Prompter + ?Sized,
    {
        for (done, upsert) in upserts.iter().enumerate() {
            let record_id = match self.send_upsert(upsert, prompter).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(
                        day = %upsert.day,
                        period_id = upsert.period_id,
                        saved_before_failure = done,
                        remaining = upserts.len() - done,
                        error = %e,
                        "Upsert failed, stopping save",
                    );
                    return Err(e);
                }
            };
            grid.commit_cell(upsert.day, upsert.period_id, &upsert.payload.slots, record_id)?;
        }
        Ok(upserts.len())
    }

    /// Re-list the context's rows when a committed cell has no record id.
    /// A failed listing is logged; the cell then cannot be cleared until
    /// the timetable is reloaded.
    async fn resolve_missing_ids(&self, grid: &mut GridState, options: &SaveOptions) {
        let missing = grid.cells_missing_record_id();
        if missing.is_empty() {
            return;
        }
        match self.api.list_records(options.context).await {
            Ok(records) => {
                let adopted = grid.adopt_record_ids(&records);
                tracing::info!(
                    context = %options.context,
                    missing = missing.len(),
                    adopted,
                    "Record ids resolved after save",
                );
            }
            Err(e) => {
                tracing::warn!(
                    context = %options.context,
                    missing = missing.len(),
                    error = %e,
                    "Could not look up record ids after save",
                );
            }
        }
    }

    /// One upsert, with a single confirmed retry on a duplicate conflict.
    async fn send_upsert<P>(&self, upsert: &CellUpsert, prompter: &P) -> Result<Option<DbId>, SaveError>
    where
        P: Prompter + ?Sized,
    {
        let failed = |source: ApiError| SaveError::UpsertFailed {
            day: upsert.day,
            period_id: upsert.period_id,
            source,
        };

        match self.api.upsert_assignment(&upsert.payload).await {
            Ok(id) => Ok(id),
            Err(ApiError::Conflict { message }) => {
                if !prompter.confirm_duplicate(&message) {
                    return Err(SaveError::DuplicateDeclined {
                        day: upsert.day,
                        period_id: upsert.period_id,
                        message,
                    });
                }
                tracing::info!(
                    day = %upsert.day,
                    period_id = upsert.period_id,
                    "Duplicate confirmed, resending",
                );
                self.api
                    .upsert_assignment(&upsert.payload.confirmed())
                    .await
                    .map_err(failed)
            }
            Err(source) => Err(failed(source)),
        }
    }
}
