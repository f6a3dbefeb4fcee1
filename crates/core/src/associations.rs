//! Lookup of legal (class, subject, teacher) triples.

use std::collections::BTreeMap;

use crate::types::{ClassSubjectTeacher, DbId, Subject, Teacher};

#[derive(Debug, Clone, Default)]
pub struct AssociationIndex {
    by_class: BTreeMap<DbId, Vec<(Subject, Teacher)>>,
}

impl AssociationIndex {
    pub fn new(rows: &[ClassSubjectTeacher]) -> Self {
        let mut by_class: BTreeMap<DbId, Vec<(Subject, Teacher)>> = BTreeMap::new();
        for row in rows {
            let pairs = by_class.entry(row.class_id).or_default();
            let exists = pairs
                .iter()
                .any(|(s, t)| s.id == row.subject.id && t.id == row.teacher.id);
            if !exists {
                pairs.push((row.subject.clone(), row.teacher.clone()));
            }
        }
        Self { by_class }
    }

    /// Distinct subjects taught to a class, in first-seen order.
    pub fn subjects_for_class(&self, class_id: DbId) -> Vec<&Subject> {
        let mut out: Vec<&Subject> = Vec::new();
        for (subject, _) in self.by_class.get(&class_id).into_iter().flatten() {
            if !out.iter().any(|s| s.id == subject.id) {
                out.push(subject);
            }
        }
        out
    }

    /// Teachers who teach `subject_id` to `class_id`.
    pub fn teachers_for(&self, class_id: DbId, subject_id: DbId) -> Vec<&Teacher> {
        self.by_class
            .get(&class_id)
            .into_iter()
            .flatten()
            .filter(|(s, _)| s.id == subject_id)
            .map(|(_, t)| t)
            .collect()
    }

    pub fn is_legal(&self, class_id: DbId, subject_id: DbId, teacher_id: DbId) -> bool {
        self.teachers_for(class_id, subject_id)
            .iter()
            .any(|t| t.id == teacher_id)
    }

    /// Subject name by id across all classes.
    pub fn subject_name(&self, subject_id: DbId) -> Option<&str> {
        self.by_class
            .values()
            .flatten()
            .find(|(s, _)| s.id == subject_id)
            .map(|(s, _)| s.name.as_str())
    }

    /// Teacher name by id across all classes.
    pub fn teacher_name(&self, teacher_id: DbId) -> Option<&str> {
        self.by_class
            .values()
            .flatten()
            .find(|(_, t)| t.id == teacher_id)
            .map(|(_, t)| t.name.as_str())
    }
}
