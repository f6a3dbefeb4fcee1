//! User confirmations and the editor that applies them.
//!
//! [`GridState`] only reports when a week-wide edit is possible; the
//! [`GridEditor`] asks a [`Prompter`] and applies the bulk edit on
//! confirmation.

use crate::grid::{GridError, GridState, WeekClearOffer, WeekFillOffer};
use crate::slot::SlotField;
use crate::types::{DbId, Day};

/// Source of yes/no answers from the person editing the grid.
pub trait Prompter: Send + Sync {
    /// "Fill for the whole week?"
    fn confirm_week_fill(&self, offer: &WeekFillOffer) -> bool;

    /// "Clear this period for the whole week?"
    fn confirm_week_clear(&self, offer: &WeekClearOffer) -> bool;

    /// The server flagged a duplicate assignment; send it anyway?
    fn confirm_duplicate(&self, message: &str) -> bool;
}

/// Answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Prompter for FixedAnswer {
    fn confirm_week_fill(&self, _offer: &WeekFillOffer) -> bool {
        self.0
    }

    fn confirm_week_clear(&self, _offer: &WeekClearOffer) -> bool {
        self.0
    }

    fn confirm_duplicate(&self, _message: &str) -> bool {
        self.0
    }
}

/// What an edit did beyond the targeted cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Only the targeted cell changed.
    None,
    /// The Monday cell was copied to every day.
    FilledWeek,
    /// The period was cleared on every day.
    ClearedWeek,
}

pub struct GridEditor<P> {
    grid: GridState,
    prompter: P,
}

impl<P: Prompter> GridEditor<P> {
    pub fn new(grid: GridState, prompter: P) -> Self {
        Self { grid, prompter }
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Split borrow for callers that mutate the grid while prompting.
    pub fn parts_mut(&mut self) -> (&mut GridState, &P) {
        (&mut self.grid, &self.prompter)
    }

    pub fn into_grid(self) -> GridState {
        self.grid
    }

    pub fn set_slot(
        &mut self,
        day: Day,
        period_id: DbId,
        index: usize,
        field: SlotField,
        value: DbId,
    ) -> Result<Propagation, GridError> {
        let offer = self.grid.set_slot(day, period_id, index, field, value)?;
        match offer {
            Some(offer) if self.prompter.confirm_week_fill(&offer) => {
                self.grid.fill_week(offer.period_id, Day::Monday)?;
                Ok(Propagation::FilledWeek)
            }
            _ => Ok(Propagation::None),
        }
    }

    pub fn add_slot(&mut self, day: Day, period_id: DbId) -> Result<(), GridError> {
        self.grid.add_slot(day, period_id)
    }

    pub fn remove_slot(&mut self, day: Day, period_id: DbId, index: usize) -> Result<(), GridError> {
        self.grid.remove_slot(day, period_id, index)
    }

    pub fn clear_cell(&mut self, day: Day, period_id: DbId) -> Result<Propagation, GridError> {
        let offer = self.grid.clear_cell(day, period_id)?;
        match offer {
            Some(offer) if self.prompter.confirm_week_clear(&offer) => {
                self.grid.clear_week(offer.period_id)?;
                Ok(Propagation::ClearedWeek)
            }
            _ => Ok(Propagation::None),
        }
    }
}
