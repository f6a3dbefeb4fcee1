//! In-memory timetable grid: live cells plus the last saved snapshot.
//!
//! Cells are keyed by `(Day, period_id)`. Every cell holds between one and
//! [`MAX_SLOTS_PER_CELL`] slots; an "empty" cell is a single empty slot.

use std::collections::BTreeMap;

use crate::record::{FlatSlots, TimetableRecord};
use crate::slot::{cell_is_empty, occupied_pairs, AssignmentSlot, SlotField, MAX_SLOTS_PER_CELL};
use crate::status::{cell_status, SlotStatus};
use crate::types::{DbId, Day, UNSET};

pub type CellKey = (Day, DbId);

/// Errors from grid mutations. A failed mutation leaves the grid untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("No cell for {day} period {period_id}")]
    UnknownCell { day: Day, period_id: DbId },

    #[error("Slot {index} out of range (cell has {len})")]
    SlotIndexOutOfRange { index: usize, len: usize },

    #[error("A period can hold at most {max} assignments")]
    SlotLimitReached { max: usize },
}

/// Raised when a Monday slot becomes complete; the caller may copy the
/// Monday cell to the rest of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekFillOffer {
    pub period_id: DbId,
}

/// Raised when a Monday cell is cleared; the caller may clear the period on
/// every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekClearOffer {
    pub period_id: DbId,
}

fn empty_cell() -> Vec<AssignmentSlot> {
    vec![AssignmentSlot::EMPTY]
}

#[derive(Debug, Clone, Default)]
pub struct GridState {
    periods: Vec<DbId>,
    live: BTreeMap<CellKey, Vec<AssignmentSlot>>,
    snapshot: BTreeMap<CellKey, Vec<AssignmentSlot>>,
    revision: u64,
}

impl GridState {
    /// A grid with one empty cell per (day, period).
    pub fn new(period_ids: impl IntoIterator<Item = DbId>) -> Self {
        let mut grid = Self::default();
        for period_id in period_ids {
            grid.ensure_period(period_id);
        }
        grid
    }

    /// Replace live and snapshot state with the given persisted rows.
    ///
    /// Cells without a row become empty. Rows for unseen periods add the
    /// period to the grid.
    pub fn hydrate(&mut self, records: &[TimetableRecord]) {
        for record in records {
            self.ensure_period(record.period_id);
        }
        for cell in self.live.values_mut().chain(self.snapshot.values_mut()) {
            *cell = empty_cell();
        }
        for record in records {
            let key = (record.day, record.period_id);
            let cell = record.cell();
            self.snapshot.insert(key, cell.clone());
            self.live.insert(key, cell);
        }
        self.bump();
    }

    fn ensure_period(&mut self, period_id: DbId) {
        if self.periods.contains(&period_id) {
            return;
        }
        self.periods.push(period_id);
        for day in Day::ALL {
            self.live.insert((day, period_id), empty_cell());
            self.snapshot.insert((day, period_id), empty_cell());
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ---- queries ----

    /// Period ids in the order they were added.
    pub fn periods(&self) -> &[DbId] {
        &self.periods
    }

    /// Monotonic counter incremented on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cell(&self, day: Day, period_id: DbId) -> Result<&[AssignmentSlot], GridError> {
        self.live
            .get(&(day, period_id))
            .map(Vec::as_slice)
            .ok_or(GridError::UnknownCell { day, period_id })
    }

    pub fn snapshot_cell(&self, day: Day, period_id: DbId) -> Result<&[AssignmentSlot], GridError> {
        self.snapshot
            .get(&(day, period_id))
            .map(Vec::as_slice)
            .ok_or(GridError::UnknownCell { day, period_id })
    }

    /// Status of each slot in a cell, derived against the snapshot.
    pub fn status(&self, day: Day, period_id: DbId) -> Result<Vec<SlotStatus>, GridError> {
        Ok(cell_status(
            self.cell(day, period_id)?,
            self.snapshot_cell(day, period_id)?,
        ))
    }

    /// Every cell with its snapshot, ordered by day then period id.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &[AssignmentSlot], &[AssignmentSlot])> {
        self.live.iter().map(|(key, live)| {
            let saved = self.snapshot.get(key).map(Vec::as_slice).unwrap_or(&[]);
            (*key, live.as_slice(), saved)
        })
    }

    /// True when any cell's assignments differ from its snapshot.
    pub fn is_dirty(&self) -> bool {
        self.cells()
            .any(|(_, live, saved)| occupied_pairs(live) != occupied_pairs(saved))
    }

    // ---- mutations ----

    fn cell_mut(&mut self, day: Day, period_id: DbId) -> Result<&mut Vec<AssignmentSlot>, GridError> {
        self.live
            .get_mut(&(day, period_id))
            .ok_or(GridError::UnknownCell { day, period_id })
    }

    /// Set one field of one slot. Changing the subject resets the teacher.
    ///
    /// Returns a [`WeekFillOffer`] when a Monday slot has just become
    /// complete.
    pub fn set_slot(
        &mut self,
        day: Day,
        period_id: DbId,
        index: usize,
        field: SlotField,
        value: DbId,
    ) -> Result<Option<WeekFillOffer>, GridError> {
        let cell = self.cell_mut(day, period_id)?;
        let len = cell.len();
        let slot = cell
            .get_mut(index)
            .ok_or(GridError::SlotIndexOutOfRange { index, len })?;

        let was_complete = slot.is_complete();
        match field {
            SlotField::Subject => {
                slot.subject_id = value;
                slot.teacher_id = UNSET;
            }
            SlotField::Teacher => slot.teacher_id = value,
        }
        let now_complete = slot.is_complete();
        self.bump();

        let offer = (day == Day::Monday && now_complete && !was_complete)
            .then_some(WeekFillOffer { period_id });
        Ok(offer)
    }

    /// Append an empty slot. Fails without mutating when the cell is full.
    pub fn add_slot(&mut self, day: Day, period_id: DbId) -> Result<(), GridError> {
        let cell = self.cell_mut(day, period_id)?;
        if cell.len() >= MAX_SLOTS_PER_CELL {
            return Err(GridError::SlotLimitReached {
                max: MAX_SLOTS_PER_CELL,
            });
        }
        cell.push(AssignmentSlot::EMPTY);
        self.bump();
        Ok(())
    }

    /// Remove a slot. The last remaining slot is reset instead of removed.
    pub fn remove_slot(&mut self, day: Day, period_id: DbId, index: usize) -> Result<(), GridError> {
        let cell = self.cell_mut(day, period_id)?;
        let len = cell.len();
        if index >= len {
            return Err(GridError::SlotIndexOutOfRange { index, len });
        }
        if len == 1 {
            // The record id stays so the reconciler can delete the row.
            let id = cell[0].id;
            cell[0] = AssignmentSlot {
                id,
                ..AssignmentSlot::EMPTY
            };
        } else {
            let removed = cell.remove(index);
            if index == 0 && cell[0].id.is_none() {
                cell[0].id = removed.id;
            }
        }
        self.bump();
        Ok(())
    }

    /// Reset a cell to a single empty slot.
    ///
    /// Returns a [`WeekClearOffer`] when the cleared cell is on Monday.
    pub fn clear_cell(
        &mut self,
        day: Day,
        period_id: DbId,
    ) -> Result<Option<WeekClearOffer>, GridError> {
        let cell = self.cell_mut(day, period_id)?;
        let id = cell.first().and_then(|s| s.id);
        *cell = vec![AssignmentSlot {
            id,
            ..AssignmentSlot::EMPTY
        }];
        self.bump();
        Ok((day == Day::Monday).then_some(WeekClearOffer { period_id }))
    }

    /// Copy the `source` day's cell to every day for this period.
    ///
    /// Each day receives its own copy; record ids of the target days are
    /// kept so their rows are updated rather than duplicated.
    pub fn fill_week(&mut self, period_id: DbId, source: Day) -> Result<(), GridError> {
        let pairs: Vec<AssignmentSlot> = self
            .cell(source, period_id)?
            .iter()
            .map(|s| AssignmentSlot::new(s.subject_id, s.teacher_id))
            .collect();

        for day in Day::ALL {
            let cell = self.cell_mut(day, period_id)?;
            let id = cell.first().and_then(|s| s.id);
            let mut copy = pairs.clone();
            copy[0].id = id;
            *cell = copy;
        }
        self.bump();
        Ok(())
    }

    /// Clear this period on every day.
    pub fn clear_week(&mut self, period_id: DbId) -> Result<(), GridError> {
        for day in Day::ALL {
            self.clear_cell(day, period_id)?;
        }
        Ok(())
    }

    // ---- snapshot maintenance ----

    /// Record that a cell was persisted as `sent`. Live and snapshot both
    /// take the sent columns, so a context override of a slot shows up in
    /// the grid. `record_id` replaces the cell's record id when the server
    /// returned one.
    pub fn commit_cell(
        &mut self,
        day: Day,
        period_id: DbId,
        sent: &FlatSlots,
        record_id: Option<DbId>,
    ) -> Result<(), GridError> {
        let cell = self.cell_mut(day, period_id)?;
        let mut saved = sent.to_cell();
        saved[0].id = record_id.or(cell[0].id);
        *cell = saved.clone();
        self.snapshot.insert((day, period_id), saved);
        self.bump();
        Ok(())
    }

    /// Cells whose snapshot is occupied but carries no record id.
    pub fn cells_missing_record_id(&self) -> Vec<CellKey> {
        self.snapshot
            .iter()
            .filter(|(_, saved)| !cell_is_empty(saved) && saved[0].id.is_none())
            .map(|(key, _)| *key)
            .collect()
    }

    /// Take record ids from freshly listed rows for committed cells that
    /// lack one. Only rows whose pairs match the snapshot are used; nothing
    /// else in the grid changes. Returns the number of cells updated.
    pub fn adopt_record_ids(&mut self, records: &[TimetableRecord]) -> usize {
        let mut adopted = 0;
        for record in records {
            let Some(id) = record.id else { continue };
            let key = (record.day, record.period_id);
            let Some(saved) = self.snapshot.get_mut(&key) else {
                continue;
            };
            if saved[0].id.is_some() || occupied_pairs(saved) != occupied_pairs(&record.cell()) {
                continue;
            }
            saved[0].id = Some(id);
            if let Some(live) = self.live.get_mut(&key) {
                if live[0].id.is_none() {
                    live[0].id = Some(id);
                }
            }
            adopted += 1;
        }
        if adopted > 0 {
            self.bump();
        }
        adopted
    }

    /// Record that a cell's rows were deleted on the server.
    pub fn commit_deleted(&mut self, day: Day, period_id: DbId) -> Result<(), GridError> {
        let cell = self.cell_mut(day, period_id)?;
        debug_assert!(cell_is_empty(cell));
        *cell = empty_cell();
        self.snapshot.insert((day, period_id), empty_cell());
        self.bump();
        Ok(())
    }
}
