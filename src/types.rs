//! Core types: task outcomes, index-ordered batches, and the fact payload

use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Result of one task execution, tagged with the task's position in its batch.
///
/// A value and an error cannot both be present: the payload is a
/// `Result<T, TaskError>`, so `error().is_none()` holds exactly when the task
/// succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<T> {
    index: usize,
    result: Result<T, TaskError>,
}

impl<T> Outcome<T> {
    /// Create an outcome for the task at `index`
    pub fn new(index: usize, result: Result<T, TaskError>) -> Self {
        Self { index, result }
    }

    /// Successful outcome
    pub fn success(index: usize, value: T) -> Self {
        Self::new(index, Ok(value))
    }

    /// Failed outcome
    pub fn failure(index: usize, error: TaskError) -> Self {
        Self::new(index, Err(error))
    }

    /// Position of the task in the original batch (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    /// The task's value, if it succeeded
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// The task's failure cause, if it failed
    pub fn error(&self) -> Option<&TaskError> {
        self.result.as_ref().err()
    }

    /// Whether the task produced a value
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the task failed
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }

    /// Borrow the underlying result
    pub fn result(&self) -> &Result<T, TaskError> {
        &self.result
    }

    /// Consume the outcome, keeping only the result
    pub fn into_result(self) -> Result<T, TaskError> {
        self.result
    }

    /// Transform the success value, keeping index and error untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            index: self.index,
            result: self.result.map(f),
        }
    }
}

/// Index-ordered collection of every outcome of one batch.
///
/// Built only by the coordinator, which guarantees `len() == N` and
/// `batch[i].index() == i` for the N tasks it launched.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<T> {
    outcomes: Vec<Outcome<T>>,
}

impl<T> Batch<T> {
    /// Batch with no tasks
    pub fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    /// Wrap outcomes that are already in index order
    pub(crate) fn from_ordered(outcomes: Vec<Outcome<T>>) -> Self {
        debug_assert!(outcomes.iter().enumerate().all(|(i, o)| o.index == i));
        Self { outcomes }
    }

    /// Number of outcomes (equals the number of tasks launched)
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the batch had no tasks
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome of the task at `index`
    pub fn get(&self, index: usize) -> Option<&Outcome<T>> {
        self.outcomes.get(index)
    }

    /// Outcomes in index order
    pub fn iter(&self) -> std::slice::Iter<'_, Outcome<T>> {
        self.outcomes.iter()
    }

    /// Outcomes as a slice
    pub fn as_slice(&self) -> &[Outcome<T>] {
        &self.outcomes
    }

    /// Successful values with their index, in index order
    pub fn successes(&self) -> impl Iterator<Item = (usize, &T)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.value().map(|v| (o.index, v)))
    }

    /// Failures with their index, in index order
    pub fn failures(&self) -> impl Iterator<Item = (usize, &TaskError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.index, e)))
    }

    /// Number of tasks that produced a value
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of tasks that failed
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Consume the batch, returning the outcomes in index order
    pub fn into_outcomes(self) -> Vec<Outcome<T>> {
        self.outcomes
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> std::ops::Index<usize> for Batch<T> {
    type Output = Outcome<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.outcomes[index]
    }
}

impl<T> IntoIterator for Batch<T> {
    type Item = Outcome<T>;
    type IntoIter = std::vec::IntoIter<Outcome<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Batch<T> {
    type Item = &'a Outcome<T>;
    type IntoIter = std::slice::Iter<'a, Outcome<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// A single fact as returned by the fact endpoint
///
/// ```json
/// { "fact": "Cats sleep 70% of their lives.", "length": 30 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Fact {
    /// The fact text
    pub fact: String,

    /// Length of the fact as reported by the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl Fact {
    /// Create a fact without a reported length
    pub fn new(fact: impl Into<String>) -> Self {
        Self {
            fact: fact.into(),
            length: None,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fact)
    }
}
