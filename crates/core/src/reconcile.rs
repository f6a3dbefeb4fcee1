//! Turn grid edits into an ordered set of backend requests.
//!
//! Planning is pure: it reads the live cells and the snapshot and produces
//! a [`SavePlan`]. Executing the plan (deletes first, then upserts one by
//! one) is the client's job.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::grid::GridState;
use crate::record::AssignmentPayload;
use crate::slot::{cell_is_empty, occupied_pairs};
use crate::types::{DbId, Day, GridContext};

/// Bulk fields applied to every row of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub context: GridContext,
    pub effect_from: NaiveDate,
    pub published: bool,
}

/// A cell that was occupied in the snapshot and is now empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDeletion {
    pub day: Day,
    pub period_id: DbId,
    /// Persisted rows to delete; empty when the cell was never stored.
    pub record_ids: Vec<DbId>,
}

/// A cell whose assignments must be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpsert {
    pub day: Day,
    pub period_id: DbId,
    pub payload: AssignmentPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavePlan {
    pub deletions: Vec<CellDeletion>,
    pub upserts: Vec<CellUpsert>,
    /// Cells holding at least one non-empty slot after the save.
    pub occupied_cells: usize,
}

impl SavePlan {
    /// Nothing to send.
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.upserts.is_empty()
    }

    /// The save leaves the whole timetable empty.
    pub fn clears_everything(&self) -> bool {
        self.occupied_cells == 0
    }

    /// Number of DELETE requests the plan will issue.
    pub fn delete_request_count(&self) -> usize {
        self.deletions.iter().map(|d| d.record_ids.len()).sum()
    }
}

/// Plan the requests needed to bring the backend in line with the grid.
///
/// Fails before producing any request when an occupied cell holds a slot
/// with only one of subject/teacher set, or when a cleared cell has no
/// record id to delete.
pub fn plan_save(grid: &GridState, options: &SaveOptions) -> Result<SavePlan, CoreError> {
    let incomplete: Vec<String> = grid
        .cells()
        .filter(|(_, live, _)| live.iter().any(|s| s.is_incomplete()))
        .map(|((day, period_id), _, _)| format!("{day} period {period_id}"))
        .collect();
    if !incomplete.is_empty() {
        return Err(CoreError::Validation(format!(
            "choose both a subject and a teacher for: {}",
            incomplete.join(", ")
        )));
    }

    let mut plan = SavePlan::default();
    let mut unknown_rows: Vec<String> = Vec::new();
    for ((day, period_id), live, saved) in grid.cells() {
        if cell_is_empty(live) {
            if !cell_is_empty(saved) {
                let mut record_ids: Vec<DbId> = Vec::new();
                for id in saved.iter().chain(live.iter()).filter_map(|s| s.id) {
                    if !record_ids.contains(&id) {
                        record_ids.push(id);
                    }
                }
                if record_ids.is_empty() {
                    unknown_rows.push(format!("{day} period {period_id}"));
                    continue;
                }
                plan.deletions.push(CellDeletion {
                    day,
                    period_id,
                    record_ids,
                });
            }
            continue;
        }

        plan.occupied_cells += 1;
        if occupied_pairs(live) != occupied_pairs(saved) {
            plan.upserts.push(CellUpsert {
                day,
                period_id,
                payload: AssignmentPayload::for_cell(
                    options.context,
                    day,
                    period_id,
                    live,
                    options.effect_from,
                    options.published,
                ),
            });
        }
    }
    if !unknown_rows.is_empty() {
        return Err(CoreError::Validation(format!(
            "reload the timetable before clearing, no stored record id for: {}",
            unknown_rows.join(", ")
        )));
    }
    Ok(plan)
}
