//! Per-node affinity scores keyed by degree course.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::course::DegreeCourse;

/// A (course, value) affinity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimationEntry {
    #[serde(rename = "degreeCourse")]
    pub degree_course: DegreeCourse,
    pub value: f64,
}

impl EstimationEntry {
    pub fn new(degree_course: DegreeCourse, value: f64) -> Self {
        Self {
            degree_course,
            value,
        }
    }

    pub fn zero(degree_course: DegreeCourse) -> Self {
        Self::new(degree_course, 0.0)
    }
}

/// Ordered set of estimations, at most one meaningful entry per course.
///
/// Lookups and updates always target the first entry for a course, so a set
/// read from a wire form with duplicate courses never grows further.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstimationSet {
    entries: Vec<EstimationEntry>,
}

impl EstimationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One zero-valued entry per scored course, in declaration order.
    pub fn seeded() -> Self {
        Self {
            entries: DegreeCourse::SCORED
                .iter()
                .map(|&c| EstimationEntry::zero(c))
                .collect(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = EstimationEntry>) -> Self {
        let mut set = Self::new();
        for entry in entries {
            set.upsert(entry);
        }
        set
    }

    pub fn entries(&self) -> &[EstimationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &EstimationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, course: DegreeCourse) -> bool {
        self.entries.iter().any(|e| e.degree_course == course)
    }

    pub fn get(&self, course: DegreeCourse) -> Option<&EstimationEntry> {
        self.entries.iter().find(|e| e.degree_course == course)
    }

    pub fn get_mut(&mut self, course: DegreeCourse) -> Option<&mut EstimationEntry> {
        self.entries.iter_mut().find(|e| e.degree_course == course)
    }

    pub fn value(&self, course: DegreeCourse) -> Option<f64> {
        self.get(course).map(|e| e.value)
    }

    /// Replace the value of an existing course or append a new entry.
    pub fn upsert(&mut self, entry: EstimationEntry) {
        match self.get_mut(entry.degree_course) {
            Some(existing) => existing.value = entry.value,
            None => self.entries.push(entry),
        }
    }

    /// Add points to an existing course. Returns false if the course is absent.
    pub fn add_points(&mut self, entry: &EstimationEntry) -> bool {
        match self.get_mut(entry.degree_course) {
            Some(existing) => {
                existing.value += entry.value;
                true
            }
            None => false,
        }
    }

    /// Raise each course to the larger of both values; copy missing courses in.
    pub fn reconcile_max(&mut self, incoming: &EstimationSet) {
        for entry in incoming.iter() {
            match self.get_mut(entry.degree_course) {
                Some(existing) => existing.value = existing.value.max(entry.value),
                None => self.entries.push(*entry),
            }
        }
    }
}

impl<'a> IntoIterator for &'a EstimationSet {
    type Item = &'a EstimationEntry;
    type IntoIter = std::slice::Iter<'a, EstimationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Read `null` or a missing field as an empty sequence.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
