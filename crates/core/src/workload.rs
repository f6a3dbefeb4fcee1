//! Daily and weekly counts of assigned slots.

use std::collections::BTreeMap;

use crate::grid::GridState;
use crate::types::Day;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    pub daily: BTreeMap<Day, usize>,
    pub weekly: usize,
}

impl Workload {
    /// Count complete slots per day. Every day appears, even at zero.
    pub fn compute(grid: &GridState) -> Self {
        let mut daily: BTreeMap<Day, usize> = Day::ALL.into_iter().map(|d| (d, 0)).collect();
        for ((day, _), live, _) in grid.cells() {
            let assigned = live.iter().filter(|s| s.is_complete()).count();
            *daily.entry(day).or_default() += assigned;
        }
        let weekly = daily.values().sum();
        Self { daily, weekly }
    }

    pub fn for_day(&self, day: Day) -> usize {
        self.daily.get(&day).copied().unwrap_or(0)
    }
}

/// Caches the last [`Workload`] and recomputes only when the grid's
/// revision has moved.
#[derive(Debug, Default)]
pub struct WorkloadMemo {
    revision: Option<u64>,
    value: Workload,
}

impl WorkloadMemo {
    pub fn get(&mut self, grid: &GridState) -> &Workload {
        if self.revision != Some(grid.revision()) {
            self.value = Workload::compute(grid);
            self.revision = Some(grid.revision());
        }
        &self.value
    }
}
