//! The candidate value object: one parameter assignment under evaluation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::param::ParamValue;

/// Unique identifier of a [`Candidate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CandidateId(Uuid);

impl CandidateId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// A parameter assignment together with its evaluation outcome.
///
/// Identity is the [`id`](Candidate::id): two candidates compare equal iff
/// their ids match, so an updated clone replaces the original wherever the
/// original was stored.
///
/// # Example
///
/// ```
/// use hypersearch::{Candidate, ParamValue};
///
/// let mut c = Candidate::new([("lr", ParamValue::Float(0.01))]);
/// assert!(c.result.is_none());
/// c.set_result(0.25);
/// assert_eq!(c.result, Some(0.25));
/// assert_eq!(c.get("lr"), Some(&ParamValue::Float(0.01)));
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    id: CandidateId,
    /// Parameter values keyed by parameter name.
    pub params: BTreeMap<String, ParamValue>,
    /// The evaluation result, once known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub result: Option<f64>,
    /// Whether the evaluation failed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub failed: bool,
    /// The cost of the evaluation, e.g. wall-clock seconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: Option<f64>,
    /// Free-form information about the worker that evaluated the candidate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub worker_information: Option<String>,
    /// When the candidate last changed lifecycle state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_update_time: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Creates an unevaluated candidate with a fresh id.
    #[must_use]
    pub fn new<I, K>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: Into<String>,
    {
        Self {
            id: CandidateId::new(),
            params: params.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            result: None,
            failed: false,
            cost: None,
            worker_information: None,
            last_update_time: None,
        }
    }

    /// Returns the candidate with `result` set.
    #[must_use]
    pub fn with_result(mut self, result: f64) -> Self {
        self.result = Some(result);
        self
    }

    /// Returns the candidate marked as failed.
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.failed = true;
        self
    }

    /// The candidate's identity.
    #[must_use]
    pub fn id(&self) -> CandidateId {
        self.id
    }

    /// Records the evaluation result.
    pub fn set_result(&mut self, result: f64) {
        self.result = Some(result);
    }

    /// Marks the evaluation as failed.
    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    /// The value assigned to parameter `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Returns `true` if the candidate has a result and did not fail.
    #[must_use]
    pub fn has_valid_result(&self) -> bool {
        !self.failed && self.result.is_some_and(|r| !r.is_nan())
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_update_time = Some(now);
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Candidate {}
