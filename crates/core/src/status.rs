//! Per-slot edit status relative to the last saved snapshot.

use serde::{Deserialize, Serialize};

use crate::slot::AssignmentSlot;
use crate::types::UNSET;

/// Status of one slot compared with the snapshot slot at the same index.
///
/// - `Empty`   -- no subject chosen.
/// - `Pending` -- a subject is chosen and the pair differs from the snapshot.
/// - `Saved`   -- the pair matches the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    #[serde(rename = "")]
    Empty,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "saved")]
    Saved,
}

impl SlotStatus {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Pending => "pending",
            Self::Saved => "saved",
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the status of `live` against its snapshot counterpart, if any.
pub fn slot_status(live: &AssignmentSlot, saved: Option<&AssignmentSlot>) -> SlotStatus {
    if live.subject_id == UNSET {
        return SlotStatus::Empty;
    }
    match saved {
        Some(saved) if live.same_pair(saved) => SlotStatus::Saved,
        _ => SlotStatus::Pending,
    }
}

/// Derive the status array of a whole cell, index by index.
pub fn cell_status(live: &[AssignmentSlot], saved: &[AssignmentSlot]) -> Vec<SlotStatus> {
    live.iter()
        .enumerate()
        .map(|(i, slot)| slot_status(slot, saved.get(i)))
        .collect()
}
