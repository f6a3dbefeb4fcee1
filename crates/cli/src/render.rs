//! Plain-text rendering of a grid and its workload.

use std::fmt::Write;

use schoolgrid_client::loader::ReferenceData;
use schoolgrid_core::associations::AssociationIndex;
use schoolgrid_core::grid::GridState;
use schoolgrid_core::reconcile::SavePlan;
use schoolgrid_core::slot::AssignmentSlot;
use schoolgrid_core::status::SlotStatus;
use schoolgrid_core::types::{DbId, Day, UNSET};
use schoolgrid_core::workload::Workload;

/// Display names resolved from loaded reference data, falling back to ids.
pub struct Labels<'a> {
    data: &'a ReferenceData,
    index: AssociationIndex,
}

impl<'a> Labels<'a> {
    pub fn new(data: &'a ReferenceData) -> Self {
        Self {
            data,
            index: data.association_index(),
        }
    }

    fn period(&self, period_id: DbId) -> String {
        self.data
            .period_name(period_id)
            .map_or_else(|| format!("#{period_id}"), str::to_string)
    }

    fn slot(&self, slot: &AssignmentSlot) -> String {
        let subject = self
            .index
            .subject_name(slot.subject_id)
            .map_or_else(|| format!("#{}", slot.subject_id), str::to_string);
        let teacher = match slot.teacher_id {
            UNSET => "?".to_string(),
            id => self
                .index
                .teacher_name(id)
                .map_or_else(|| format!("#{id}"), str::to_string),
        };
        format!("{subject}/{teacher}")
    }
}

/// Cell text: occupied slots joined with `+`, pending ones marked `*`.
fn cell_text(labels: &Labels<'_>, cell: &[AssignmentSlot], statuses: &[SlotStatus]) -> String {
    let parts: Vec<String> = cell
        .iter()
        .zip(statuses)
        .filter(|(slot, _)| !slot.is_empty())
        .map(|(slot, status)| match status {
            SlotStatus::Pending => format!("{}*", labels.slot(slot)),
            _ => labels.slot(slot),
        })
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" + ")
    }
}

/// Periods as rows, days as columns.
pub fn grid_table(grid: &GridState, labels: &Labels<'_>) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(grid.periods().len() + 1);

    let mut header = vec!["Period".to_string()];
    header.extend(Day::ALL.iter().map(|d| d.short().to_string()));
    rows.push(header);

    for &period_id in grid.periods() {
        let mut row = vec![labels.period(period_id)];
        for day in Day::ALL {
            let text = match (grid.cell(day, period_id), grid.status(day, period_id)) {
                (Ok(cell), Ok(statuses)) => cell_text(labels, cell, &statuses),
                _ => "-".to_string(),
            };
            row.push(text);
        }
        rows.push(row);
    }

    let columns = rows.first().map_or(0, Vec::len);
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().map(|r| r[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(text, &width)| format!("{text:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

/// Subjects taught to a class and their teachers, with the ids edit
/// scripts refer to.
pub fn subject_legend(index: &AssociationIndex, class_id: DbId) -> String {
    let mut out = String::new();
    for subject in index.subjects_for_class(class_id) {
        let teachers: Vec<String> = index
            .teachers_for(class_id, subject.id)
            .iter()
            .map(|t| format!("{} {}", t.id, t.name))
            .collect();
        let _ = writeln!(out, "{} {}: {}", subject.id, subject.name, teachers.join(", "));
    }
    out
}

pub fn workload_line(workload: &Workload) -> String {
    let mut out = String::new();
    for day in Day::ALL {
        let _ = write!(out, "{} {}  ", day.short(), workload.for_day(day));
    }
    let _ = write!(out, "| week {}", workload.weekly);
    out
}

pub fn plan_summary(plan: &SavePlan) -> String {
    let mut out = String::new();
    if plan.is_empty() {
        out.push_str("No changes to save.\n");
        return out;
    }
    for deletion in &plan.deletions {
        for record_id in &deletion.record_ids {
            let _ = writeln!(
                out,
                "DELETE {} period {} (record {record_id})",
                deletion.day, deletion.period_id
            );
        }
    }
    for upsert in &plan.upserts {
        let _ = writeln!(out, "POST   {} period {}", upsert.day, upsert.period_id);
    }
    out
}
