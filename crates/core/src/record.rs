//! Wire shapes of the backend's timetable rows.
//!
//! The backend stores one fixed-width row per (context, day, period): the
//! first slot lives in `subjectId`/`teacherId` and the rest in
//! `subjectId_N`/`teacherId_N` for N = 2..5.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::slot::{AssignmentSlot, MAX_SLOTS_PER_CELL};
use crate::types::{DbId, Day, GridContext, UNSET};

// ---------------------------------------------------------------------------
// FlatSlots
// ---------------------------------------------------------------------------

/// Up to five slots flattened into fixed columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSlots {
    #[serde(rename = "subjectId", default)]
    pub subject_id: Option<DbId>,
    #[serde(rename = "teacherId", default)]
    pub teacher_id: Option<DbId>,
    #[serde(rename = "subjectId_2", default)]
    pub subject_id_2: Option<DbId>,
    #[serde(rename = "teacherId_2", default)]
    pub teacher_id_2: Option<DbId>,
    #[serde(rename = "subjectId_3", default)]
    pub subject_id_3: Option<DbId>,
    #[serde(rename = "teacherId_3", default)]
    pub teacher_id_3: Option<DbId>,
    #[serde(rename = "subjectId_4", default)]
    pub subject_id_4: Option<DbId>,
    #[serde(rename = "teacherId_4", default)]
    pub teacher_id_4: Option<DbId>,
    #[serde(rename = "subjectId_5", default)]
    pub subject_id_5: Option<DbId>,
    #[serde(rename = "teacherId_5", default)]
    pub teacher_id_5: Option<DbId>,
}

impl FlatSlots {
    /// Flatten the non-empty slots of a cell, in order.
    ///
    /// The first position is always written (as zeros for an empty cell);
    /// unused trailing positions stay `None` and serialize as `null`.
    pub fn from_cell(cell: &[AssignmentSlot]) -> Self {
        let mut flat = FlatSlots {
            subject_id: Some(UNSET),
            teacher_id: Some(UNSET),
            ..Default::default()
        };
        let occupied = cell.iter().filter(|s| !s.is_empty());
        for (i, slot) in occupied.take(MAX_SLOTS_PER_CELL).enumerate() {
            flat.set_position(i, Some(slot.subject_id), Some(slot.teacher_id));
        }
        flat
    }

    /// Expand into a cell. Position 0 always yields a slot; later positions
    /// only when at least one of their columns is set.
    pub fn to_cell(&self) -> Vec<AssignmentSlot> {
        let mut cell = Vec::with_capacity(MAX_SLOTS_PER_CELL);
        for i in 0..MAX_SLOTS_PER_CELL {
            let (subject, teacher) = self.position(i);
            let slot = AssignmentSlot::new(subject.unwrap_or(UNSET), teacher.unwrap_or(UNSET));
            if i == 0 || !slot.is_empty() {
                cell.push(slot);
            }
        }
        cell
    }

    /// Zero-based position accessor.
    pub fn position(&self, index: usize) -> (Option<DbId>, Option<DbId>) {
        match index {
            0 => (self.subject_id, self.teacher_id),
            1 => (self.subject_id_2, self.teacher_id_2),
            2 => (self.subject_id_3, self.teacher_id_3),
            3 => (self.subject_id_4, self.teacher_id_4),
            4 => (self.subject_id_5, self.teacher_id_5),
            _ => (None, None),
        }
    }

    fn set_position(&mut self, index: usize, subject: Option<DbId>, teacher: Option<DbId>) {
        let (s, t) = match index {
            0 => (&mut self.subject_id, &mut self.teacher_id),
            1 => (&mut self.subject_id_2, &mut self.teacher_id_2),
            2 => (&mut self.subject_id_3, &mut self.teacher_id_3),
            3 => (&mut self.subject_id_4, &mut self.teacher_id_4),
            4 => (&mut self.subject_id_5, &mut self.teacher_id_5),
            _ => return,
        };
        *s = subject;
        *t = teacher;
    }
}

// ---------------------------------------------------------------------------
// TimetableRecord
// ---------------------------------------------------------------------------

/// An existing row as returned by the timetable GET endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRecord {
    #[serde(default)]
    pub id: Option<DbId>,
    pub day: Day,
    #[serde(rename = "periodId")]
    pub period_id: DbId,
    #[serde(flatten)]
    pub slots: FlatSlots,
}

impl TimetableRecord {
    /// The cell this row describes, with the record id on the first slot.
    pub fn cell(&self) -> Vec<AssignmentSlot> {
        let mut cell = self.slots.to_cell();
        cell[0].id = self.id;
        cell
    }
}

// ---------------------------------------------------------------------------
// AssignmentPayload
// ---------------------------------------------------------------------------

/// Body of `POST /period-class-teacher-subject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub period_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<DbId>,
    pub day: Day,
    pub effect_from: NaiveDate,
    pub published: bool,
    #[serde(flatten)]
    pub slots: FlatSlots,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub confirm_duplicate: bool,
}

impl AssignmentPayload {
    /// Build the row for one cell.
    ///
    /// In a teacher context the context teacher occupies `teacherId`.
    pub fn for_cell(
        context: GridContext,
        day: Day,
        period_id: DbId,
        cell: &[AssignmentSlot],
        effect_from: NaiveDate,
        published: bool,
    ) -> Self {
        let mut slots = FlatSlots::from_cell(cell);
        let class_id = match context {
            GridContext::Class(class_id) => Some(class_id),
            GridContext::Teacher(teacher_id) => {
                slots.teacher_id = Some(teacher_id);
                None
            }
        };
        Self {
            period_id,
            class_id,
            day,
            effect_from,
            published,
            slots,
            confirm_duplicate: false,
        }
    }

    /// Same row, flagged as an acknowledged duplicate.
    pub fn confirmed(&self) -> Self {
        Self {
            confirm_duplicate: true,
            ..self.clone()
        }
    }
}
