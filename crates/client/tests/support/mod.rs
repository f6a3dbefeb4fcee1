//! In-memory [`TimetableApi`] that records every call.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use schoolgrid_client::api::{ApiError, TimetableApi};
use schoolgrid_core::record::{AssignmentPayload, FlatSlots, TimetableRecord};
use schoolgrid_core::reconcile::SaveOptions;
use schoolgrid_core::types::{
    ClassInfo, ClassSubjectTeacher, DbId, Day, GridContext, Period, Subject, Teacher,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListClasses,
    ListPeriods,
    ListAssociations,
    ListRecords(GridContext),
    Upsert(AssignmentPayload),
    Delete(DbId),
}

/// Scripted answer for one upsert. Unscripted upserts get a fresh id
/// from 1000 upwards.
#[derive(Debug, Clone)]
pub enum Reply {
    Id(Option<DbId>),
    Conflict(&'static str),
    Rejected(u16, &'static str),
}

#[derive(Default)]
pub struct FakeApi {
    pub periods: Vec<Period>,
    pub records: Vec<TimetableRecord>,
    pub associations: Vec<ClassSubjectTeacher>,
    pub failing_deletes: HashSet<DbId>,
    pub failing_lists: HashSet<&'static str>,
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            periods: vec![period(1, "I"), period(2, "II")],
            ..Default::default()
        }
    }

    pub fn with_records(mut self, records: Vec<TimetableRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upserts(&self) -> Vec<AssignmentPayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upsert(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<DbId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn list_failure(&self, name: &'static str) -> Result<(), ApiError> {
        if self.failing_lists.contains(name) {
            return Err(ApiError::Rejected {
                status: 500,
                message: format!("{name} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TimetableApi for FakeApi {
    async fn list_classes(&self) -> Result<Vec<ClassInfo>, ApiError> {
        self.record(Call::ListClasses);
        self.list_failure("classes")?;
        Ok(vec![ClassInfo {
            id: 12,
            name: "7B".into(),
        }])
    }

    async fn list_periods(&self) -> Result<Vec<Period>, ApiError> {
        self.record(Call::ListPeriods);
        self.list_failure("periods")?;
        Ok(self.periods.clone())
    }

    async fn list_associations(&self) -> Result<Vec<ClassSubjectTeacher>, ApiError> {
        self.record(Call::ListAssociations);
        self.list_failure("associations")?;
        Ok(self.associations.clone())
    }

    async fn list_records(&self, context: GridContext) -> Result<Vec<TimetableRecord>, ApiError> {
        self.record(Call::ListRecords(context));
        self.list_failure("records")?;
        Ok(self.records.clone())
    }

    async fn upsert_assignment(
        &self,
        payload: &AssignmentPayload,
    ) -> Result<Option<DbId>, ApiError> {
        self.record(Call::Upsert(payload.clone()));
        let reply = self.replies.lock().unwrap().pop_front();
        let reply = reply
            .unwrap_or_else(|| Reply::Id(Some(1000 + self.next_id.fetch_add(1, Ordering::SeqCst))));
        match reply {
            Reply::Id(id) => Ok(id),
            Reply::Conflict(message) => Err(ApiError::Conflict {
                message: message.into(),
            }),
            Reply::Rejected(status, message) => Err(ApiError::Rejected {
                status,
                message: message.into(),
            }),
        }
    }

    async fn delete_assignment(&self, record_id: DbId) -> Result<(), ApiError> {
        self.record(Call::Delete(record_id));
        if self.failing_deletes.contains(&record_id) {
            return Err(ApiError::Rejected {
                status: 500,
                message: "delete failed".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn period(id: DbId, name: &str) -> Period {
    Period {
        id,
        period_name: name.into(),
    }
}

pub fn record(id: DbId, day: Day, period_id: DbId, subject: DbId, teacher: DbId) -> TimetableRecord {
    TimetableRecord {
        id: Some(id),
        day,
        period_id,
        slots: FlatSlots {
            subject_id: Some(subject),
            teacher_id: Some(teacher),
            ..Default::default()
        },
    }
}

pub fn association(class_id: DbId, subject_id: DbId, teacher_id: DbId) -> ClassSubjectTeacher {
    ClassSubjectTeacher {
        class_id,
        subject: Subject {
            id: subject_id,
            name: format!("Subject {subject_id}"),
        },
        teacher: Teacher {
            id: teacher_id,
            name: format!("Teacher {teacher_id}"),
        },
    }
}

pub fn class_options() -> SaveOptions {
    SaveOptions {
        context: GridContext::Class(12),
        effect_from: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        published: true,
    }
}

// ---------------------------------------------------------------------------
// Prompter
// ---------------------------------------------------------------------------

use schoolgrid_core::grid::{WeekClearOffer, WeekFillOffer};
use schoolgrid_core::week_fill::Prompter;

/// Answers duplicate prompts with a fixed value and remembers the messages.
pub struct RecordingPrompter {
    answer: bool,
    duplicates: Mutex<Vec<String>>,
}

impl RecordingPrompter {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            duplicates: Mutex::new(Vec::new()),
        }
    }

    pub fn duplicate_prompts(&self) -> Vec<String> {
        self.duplicates.lock().unwrap().clone()
    }
}

impl Prompter for RecordingPrompter {
    fn confirm_week_fill(&self, _offer: &WeekFillOffer) -> bool {
        self.answer
    }

    fn confirm_week_clear(&self, _offer: &WeekClearOffer) -> bool {
        self.answer
    }

    fn confirm_duplicate(&self, message: &str) -> bool {
        self.duplicates.lock().unwrap().push(message.to_string());
        self.answer
    }
}
