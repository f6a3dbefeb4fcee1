//! Edit scripts: a JSON array of grid operations applied in order.
//!
//! ```json
//! [
//!   {"op": "set", "day": "Monday", "period": 1, "field": "subject", "value": 7},
//!   {"op": "set", "day": "Monday", "period": 1, "field": "teacher", "value": 3},
//!   {"op": "add", "day": "Friday", "period": 2},
//!   {"op": "remove", "day": "Friday", "period": 2, "index": 1},
//!   {"op": "clear", "day": "Tuesday", "period": 4}
//! ]
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use schoolgrid_core::associations::AssociationIndex;
use schoolgrid_core::grid::GridState;
use schoolgrid_core::slot::SlotField;
use schoolgrid_core::status::{cell_status, SlotStatus};
use schoolgrid_core::types::{DbId, Day};
use schoolgrid_core::week_fill::{GridEditor, Propagation, Prompter};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    Set {
        day: Day,
        period: DbId,
        #[serde(default)]
        index: usize,
        field: SlotField,
        value: DbId,
    },
    Add {
        day: Day,
        period: DbId,
    },
    Remove {
        day: Day,
        period: DbId,
        #[serde(default)]
        index: usize,
    },
    Clear {
        day: Day,
        period: DbId,
    },
}

/// What a script did beyond its own operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub applied: usize,
    pub week_fills: usize,
    pub week_clears: usize,
}

pub fn parse(text: &str) -> anyhow::Result<Vec<Edit>> {
    serde_json::from_str(text).context("edit script must be a JSON array of edits")
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Edit>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading edit script {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Apply edits in order, stopping at the first one the grid rejects.
pub fn apply<P: Prompter>(editor: &mut GridEditor<P>, edits: &[Edit]) -> anyhow::Result<EditSummary> {
    let mut summary = EditSummary::default();
    for (n, edit) in edits.iter().enumerate() {
        let propagation = match *edit {
            Edit::Set {
                day,
                period,
                index,
                field,
                value,
            } => editor.set_slot(day, period, index, field, value),
            Edit::Add { day, period } => editor.add_slot(day, period).map(|()| Propagation::None),
            Edit::Remove { day, period, index } => {
                editor.remove_slot(day, period, index).map(|()| Propagation::None)
            }
            Edit::Clear { day, period } => editor.clear_cell(day, period),
        }
        .with_context(|| format!("edit #{} ({edit:?})", n + 1))?;

        match propagation {
            Propagation::FilledWeek => summary.week_fills += 1,
            Propagation::ClearedWeek => summary.week_clears += 1,
            Propagation::None => {}
        }
        summary.applied += 1;
        tracing::debug!(?edit, ?propagation, "Edit applied");
    }
    Ok(summary)
}

/// Pending pairs that no class-subject-teacher row allows for `class_id`.
/// The backend has the final say; these are only reported.
pub fn unlisted_pairs(grid: &GridState, index: &AssociationIndex, class_id: DbId) -> Vec<String> {
    let mut out = Vec::new();
    for ((day, period_id), live, saved) in grid.cells() {
        for (slot, status) in live.iter().zip(cell_status(live, saved)) {
            if status == SlotStatus::Pending
                && slot.is_complete()
                && !index.is_legal(class_id, slot.subject_id, slot.teacher_id)
            {
                out.push(format!(
                    "{day} period {period_id}: subject {} with teacher {}",
                    slot.subject_id, slot.teacher_id
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use schoolgrid_core::grid::GridState;
    use schoolgrid_core::week_fill::FixedAnswer;

    use super::*;

    const SCRIPT: &str = r#"[
        {"op": "set", "day": "Monday", "period": 1, "field": "subject", "value": 7},
        {"op": "set", "day": "Monday", "period": 1, "field": "teacher", "value": 3},
        {"op": "add", "day": "Friday", "period": 1},
        {"op": "remove", "day": "Friday", "period": 1, "index": 1},
        {"op": "clear", "day": "Tuesday", "period": 1}
    ]"#;

    #[test]
    fn parses_every_operation() {
        let edits = parse(SCRIPT).unwrap();
        assert_eq!(edits.len(), 5);
        assert_eq!(
            edits[1],
            Edit::Set {
                day: Day::Monday,
                period: 1,
                index: 0,
                field: SlotField::Teacher,
                value: 3,
            }
        );
        assert_eq!(edits[3], Edit::Remove { day: Day::Friday, period: 1, index: 1 });
    }

    #[test]
    fn rejects_unknown_operation() {
        assert!(parse(r#"[{"op": "swap", "day": "Monday", "period": 1}]"#).is_err());
    }

    #[test]
    fn apply_counts_week_fill() {
        let mut editor = GridEditor::new(GridState::new([1]), FixedAnswer(true));
        let summary = apply(&mut editor, &parse(SCRIPT).unwrap()).unwrap();

        assert_eq!(
            summary,
            EditSummary {
                applied: 5,
                week_fills: 1,
                week_clears: 0,
            }
        );
        assert_eq!(editor.grid().cell(Day::Friday, 1).unwrap()[0].pair(), (7, 3));
        assert!(editor.grid().cell(Day::Tuesday, 1).unwrap()[0].is_empty());
    }

    #[test]
    fn unlisted_pairs_reports_only_pending_unknown_pairs() {
        let rows: Vec<schoolgrid_core::types::ClassSubjectTeacher> = serde_json::from_value(
            serde_json::json!([
                {"classId": 12, "Subject": {"id": 7}, "Teacher": {"id": 3}},
            ]),
        )
        .unwrap();
        let index = AssociationIndex::new(&rows);
        let mut editor = GridEditor::new(GridState::new([1]), FixedAnswer(false));
        let edits = parse(
            r#"[
            {"op": "set", "day": "Monday", "period": 1, "field": "subject", "value": 7},
            {"op": "set", "day": "Monday", "period": 1, "field": "teacher", "value": 3},
            {"op": "set", "day": "Friday", "period": 1, "field": "subject", "value": 7},
            {"op": "set", "day": "Friday", "period": 1, "field": "teacher", "value": 5}
        ]"#,
        )
        .unwrap();
        apply(&mut editor, &edits).unwrap();

        assert_eq!(
            unlisted_pairs(editor.grid(), &index, 12),
            vec!["Friday period 1: subject 7 with teacher 5".to_string()]
        );
    }

    #[test]
    fn apply_stops_at_rejected_edit() {
        let mut editor = GridEditor::new(GridState::new([1]), FixedAnswer(false));
        let edits = parse(r#"[{"op": "remove", "day": "Monday", "period": 1, "index": 3}]"#).unwrap();

        let err = apply(&mut editor, &edits).unwrap_err();
        assert!(format!("{err:#}").contains("edit #1"));
    }
}
