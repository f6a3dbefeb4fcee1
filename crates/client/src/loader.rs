//! Reference data fetched when a timetable is opened.
//!
//! The four requests are independent: each failure is logged and leaves
//! only its own list empty.

use schoolgrid_core::associations::AssociationIndex;
use schoolgrid_core::grid::GridState;
use schoolgrid_core::record::TimetableRecord;
use schoolgrid_core::types::{ClassInfo, ClassSubjectTeacher, DbId, GridContext, Period};

use crate::api::{ApiError, TimetableApi};

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub classes: Vec<ClassInfo>,
    pub periods: Vec<Period>,
    pub associations: Vec<ClassSubjectTeacher>,
    pub records: Vec<TimetableRecord>,
}

impl ReferenceData {
    /// A grid over the loaded periods, hydrated with the loaded rows.
    pub fn grid(&self) -> GridState {
        let mut grid = GridState::new(self.periods.iter().map(|p| p.id));
        grid.hydrate(&self.records);
        grid
    }

    pub fn association_index(&self) -> AssociationIndex {
        AssociationIndex::new(&self.associations)
    }

    pub fn period_name(&self, period_id: DbId) -> Option<&str> {
        self.periods
            .iter()
            .find(|p| p.id == period_id)
            .map(|p| p.period_name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn class_name(&self, class_id: DbId) -> Option<&str> {
        self.classes
            .iter()
            .find(|c| c.id == class_id)
            .map(|c| c.name.as_str())
    }
}

/// Fetch classes, periods, associations, and existing rows concurrently.
pub async fn load_reference<A>(api: &A, context: GridContext) -> ReferenceData
where
    A: TimetableApi + ?Sized,
{
    let (classes, periods, associations, records) = tokio::join!(
        api.list_classes(),
        api.list_periods(),
        api.list_associations(),
        api.list_records(context),
    );

    let data = ReferenceData {
        classes: or_empty("classes", classes),
        periods: or_empty("periods", periods),
        associations: or_empty("class-subject-teachers", associations),
        records: or_empty("timetable", records),
    };

    tracing::info!(
        %context,
        classes = data.classes.len(),
        periods = data.periods.len(),
        associations = data.associations.len(),
        records = data.records.len(),
        "Reference data loaded",
    );
    data
}

/// Re-fetch the existing rows and re-hydrate `grid`, discarding unsaved
/// edits. On failure the grid is left as it was.
pub async fn refresh_records<A>(
    api: &A,
    context: GridContext,
    grid: &mut GridState,
) -> Result<usize, ApiError>
where
    A: TimetableApi + ?Sized,
{
    let records = api.list_records(context).await?;
    grid.hydrate(&records);
    tracing::info!(%context, records = records.len(), "Timetable refreshed");
    Ok(records.len())
}

fn or_empty<T>(resource: &'static str, result: Result<Vec<T>, ApiError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(resource, error = %e, "Failed to load reference data");
            Vec::new()
        }
    }
}
