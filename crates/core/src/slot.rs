//! A single (subject, teacher) pairing inside a timetable cell.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, UNSET};

/// Hard cap on the number of slots one cell may hold.
pub const MAX_SLOTS_PER_CELL: usize = 5;

/// One subject/teacher pair within a cell.
///
/// `id` is the persisted record backing the cell. It is only ever carried on
/// the first slot of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSlot {
    pub subject_id: DbId,
    pub teacher_id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
}

impl AssignmentSlot {
    pub const EMPTY: AssignmentSlot = AssignmentSlot {
        subject_id: UNSET,
        teacher_id: UNSET,
        id: None,
    };

    pub fn new(subject_id: DbId, teacher_id: DbId) -> Self {
        Self {
            subject_id,
            teacher_id,
            id: None,
        }
    }

    /// Both fields unset.
    pub fn is_empty(&self) -> bool {
        self.subject_id == UNSET && self.teacher_id == UNSET
    }

    /// Both fields set.
    pub fn is_complete(&self) -> bool {
        self.subject_id != UNSET && self.teacher_id != UNSET
    }

    /// Exactly one field set.
    pub fn is_incomplete(&self) -> bool {
        !self.is_empty() && !self.is_complete()
    }

    /// Compare subject/teacher only, ignoring the record id.
    pub fn same_pair(&self, other: &AssignmentSlot) -> bool {
        self.subject_id == other.subject_id && self.teacher_id == other.teacher_id
    }

    /// The slot with the record id dropped.
    pub fn pair(&self) -> (DbId, DbId) {
        (self.subject_id, self.teacher_id)
    }
}

/// Which field of a slot an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotField {
    Subject,
    Teacher,
}

/// A cell is empty when every slot in it is empty.
pub fn cell_is_empty(cell: &[AssignmentSlot]) -> bool {
    cell.iter().all(AssignmentSlot::is_empty)
}

/// Non-empty pairs of a cell in order; empty slots are skipped.
pub fn occupied_pairs(cell: &[AssignmentSlot]) -> Vec<(DbId, DbId)> {
    cell.iter()
        .filter(|s| !s.is_empty())
        .map(AssignmentSlot::pair)
        .collect()
}
