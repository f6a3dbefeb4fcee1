//! Shared identifiers and reference data shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All backend primary keys are integers.
pub type DbId = i64;

/// Sentinel for "no subject" / "no teacher" in a slot field.
pub const UNSET: DbId = 0;

// ---------------------------------------------------------------------------
// Day
// ---------------------------------------------------------------------------

/// A teaching day. The week runs Monday through Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// Every teaching day in week order.
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Wire representation, matching the backend's `day` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// Three-letter label for compact tables.
    pub fn short(&self) -> &'static str {
        &self.as_str()[..3]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = CoreError;

    /// Case-insensitive; accepts full names and three-letter abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Day::ALL
            .into_iter()
            .find(|d| {
                let name = d.as_str().to_ascii_lowercase();
                name == needle || name[..3] == needle
            })
            .ok_or_else(|| CoreError::UnknownDay(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A teaching period of the school day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: DbId,
    #[serde(default)]
    pub period_name: String,
}

/// A class (form/section) that owns a timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: DbId,
    #[serde(default, alias = "class_name", alias = "className")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: DbId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: DbId,
    #[serde(default)]
    pub name: String,
}

/// One legal (class, subject, teacher) triple.
///
/// The backend embeds the related rows under capitalised keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSubjectTeacher {
    #[serde(alias = "classId")]
    pub class_id: DbId,
    #[serde(rename = "Subject", alias = "subject")]
    pub subject: Subject,
    #[serde(rename = "Teacher", alias = "teacher")]
    pub teacher: Teacher,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Whose timetable is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridContext {
    Class(DbId),
    Teacher(DbId),
}

impl GridContext {
    pub fn id(&self) -> DbId {
        match self {
            Self::Class(id) | Self::Teacher(id) => *id,
        }
    }
}

impl fmt::Display for GridContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(id) => write!(f, "class {id}"),
            Self::Teacher(id) => write!(f, "teacher {id}"),
        }
    }
}
