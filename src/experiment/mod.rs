//! The experiment: a parameter space plus the lifecycle of every candidate.
//!
//! An [`Experiment`] owns its parameter definitions and three disjoint
//! candidate partitions (pending, working and finished). Candidates move
//! between partitions only through the four transition methods, each of
//! which validates the candidate, removes it from wherever it currently is,
//! stamps it and re-derives the best finished candidate.
//!
//! # Example
//!
//! ```
//! use hypersearch::parameter::{MinMaxNumericParamDef, OrdinalParamDef};
//! use hypersearch::{Candidate, Experiment, ParamValue};
//!
//! let mut exp = Experiment::builder("mlp")
//!     .param("lr", MinMaxNumericParamDef::new(0.0001, 0.1).unwrap())
//!     .param("depth", OrdinalParamDef::new(["shallow", "deep"]).unwrap())
//!     .minimize()
//!     .build()
//!     .unwrap();
//!
//! let c = Candidate::new([
//!     ("lr", ParamValue::Float(0.01)),
//!     ("depth", ParamValue::from("deep")),
//! ]);
//! exp.add_working(c.clone()).unwrap();
//! exp.add_finished(c.with_result(0.3)).unwrap();
//!
//! assert!(exp.candidates_working().is_empty());
//! assert_eq!(exp.best_candidate().and_then(|c| c.result), Some(0.3));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::candidate::{Candidate, CandidateId};
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::parameter::ParamDef;
use crate::types::{CandidateState, Direction};

#[cfg(feature = "serde")]
mod persistence;

#[cfg(feature = "serde")]
pub use persistence::ExperimentSnapshot;

/// The authoritative record of a search: its parameter space and the
/// lifecycle state of every candidate.
///
/// Cloning is cheap relative to the candidate lists, since the parameter
/// definitions are shared immutable `Arc`s. A clone is the snapshot handed
/// to optimizers.
#[derive(Clone, Debug)]
pub struct Experiment {
    id: String,
    name: String,
    notes: String,
    direction: Direction,
    param_defs: BTreeMap<String, Arc<dyn ParamDef>>,
    candidates_pending: Vec<Candidate>,
    candidates_working: Vec<Candidate>,
    candidates_finished: Vec<Candidate>,
    best_candidate: Option<Candidate>,
    last_update_time: DateTime<Utc>,
}

impl Experiment {
    /// Starts building an experiment called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(name)
    }

    /// The experiment id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-text notes attached to the experiment.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// The optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if lower results are better.
    #[must_use]
    pub fn is_minimization(&self) -> bool {
        self.direction == Direction::Minimize
    }

    /// The parameter definitions, keyed by name.
    #[must_use]
    pub fn param_defs(&self) -> &BTreeMap<String, Arc<dyn ParamDef>> {
        &self.param_defs
    }

    /// Candidates waiting for evaluation, including paused ones.
    #[must_use]
    pub fn candidates_pending(&self) -> &[Candidate] {
        &self.candidates_pending
    }

    /// Candidates currently being evaluated.
    #[must_use]
    pub fn candidates_working(&self) -> &[Candidate] {
        &self.candidates_working
    }

    /// Candidates whose evaluation finished, successfully or not.
    #[must_use]
    pub fn candidates_finished(&self) -> &[Candidate] {
        &self.candidates_finished
    }

    /// The best finished candidate, or `None` if nothing has finished yet.
    #[must_use]
    pub fn best_candidate(&self) -> Option<&Candidate> {
        self.best_candidate.as_ref()
    }

    /// When any candidate last changed state.
    #[must_use]
    pub fn last_update_time(&self) -> DateTime<Utc> {
        self.last_update_time
    }

    /// Total number of candidates across all partitions.
    #[must_use]
    pub fn n_candidates(&self) -> usize {
        self.candidates_pending.len() + self.candidates_working.len() + self.candidates_finished.len()
    }

    /// Looks a candidate up by id in every partition.
    #[must_use]
    pub fn candidate(&self, id: CandidateId) -> Option<(&Candidate, CandidateState)> {
        [
            (&self.candidates_pending, CandidateState::Pending),
            (&self.candidates_working, CandidateState::Working),
            (&self.candidates_finished, CandidateState::Finished),
        ]
        .into_iter()
        .find_map(|(list, state)| list.iter().find(|c| c.id() == id).map(|c| (c, state)))
    }

    /// Moves `candidate` to the pending partition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] if the candidate does not match
    /// the parameter space.
    pub fn add_pending(&mut self, candidate: Candidate) -> Result<()> {
        self.transition(candidate, CandidateState::Pending)
    }

    /// Moves `candidate` to the working partition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] if the candidate does not match
    /// the parameter space.
    pub fn add_working(&mut self, candidate: Candidate) -> Result<()> {
        self.transition(candidate, CandidateState::Working)
    }

    /// Moves `candidate` to the finished partition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] if the candidate does not match
    /// the parameter space.
    pub fn add_finished(&mut self, candidate: Candidate) -> Result<()> {
        self.transition(candidate, CandidateState::Finished)
    }

    /// Pauses `candidate`, returning it to the pending pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] if the candidate does not match
    /// the parameter space.
    pub fn add_pausing(&mut self, candidate: Candidate) -> Result<()> {
        self.transition(candidate, CandidateState::Pending)
    }

    fn transition(&mut self, mut candidate: Candidate, target: CandidateState) -> Result<()> {
        self.check_candidate(&candidate)?;
        self.remove_everywhere(candidate.id());

        let now = Utc::now();
        candidate.touch(now);
        self.last_update_time = now;

        trace_debug!(
            experiment = %self.name,
            candidate = %candidate.id(),
            state = ?target,
            "candidate transition"
        );
        self.partition_mut(target).push(candidate);
        self.update_best();
        Ok(())
    }

    fn partition_mut(&mut self, state: CandidateState) -> &mut Vec<Candidate> {
        match state {
            CandidateState::Pending => &mut self.candidates_pending,
            CandidateState::Working => &mut self.candidates_working,
            CandidateState::Finished => &mut self.candidates_finished,
        }
    }

    fn remove_everywhere(&mut self, id: CandidateId) {
        self.candidates_pending.retain(|c| c.id() != id);
        self.candidates_working.retain(|c| c.id() != id);
        self.candidates_finished.retain(|c| c.id() != id);
    }

    /// Re-derives the best candidate from the finished partition.
    pub(crate) fn update_best(&mut self) {
        let mut best: Option<&Candidate> = None;
        for c in &self.candidates_finished {
            if better_unchecked(self.direction, Some(c), best) {
                best = Some(c);
            }
        }
        let best = best.cloned();
        #[cfg(feature = "tracing")]
        if let Some(c) = &best
            && self.best_candidate.as_ref().map(Candidate::id) != Some(c.id())
        {
            trace_info!(experiment = %self.name, candidate = %c.id(), result = ?c.result, "new best candidate");
        }
        self.best_candidate = best;
    }

    /// Returns `true` if `a` is strictly better than `b`.
    ///
    /// `None` is never better than anything and anything is better than
    /// `None`. A failed or result-less candidate is never better than one
    /// with a valid result. Between two valid results the direction decides;
    /// ties go to `b`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] if either candidate does not match
    /// the parameter space.
    pub fn better(&self, a: Option<&Candidate>, b: Option<&Candidate>) -> Result<bool> {
        for c in [a, b].into_iter().flatten() {
            self.check_candidate(c)?;
        }
        Ok(better_unchecked(self.direction, a, b))
    }

    /// Validates that `candidate` assigns an in-domain value to exactly the
    /// experiment's parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCandidate`] describing the first mismatch.
    pub fn check_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.check_params(&candidate.params)
            .map_err(|reason| Error::InvalidCandidate(format!("candidate {}: {reason}", candidate.id())))
    }

    /// Returns `true` if `params` assigns an in-domain value to exactly the
    /// experiment's parameters.
    #[must_use]
    pub fn check_param_map(&self, params: &BTreeMap<String, ParamValue>) -> bool {
        self.check_params(params).is_ok()
    }

    fn check_params(&self, params: &BTreeMap<String, ParamValue>) -> core::result::Result<(), String> {
        for name in self.param_defs.keys() {
            if !params.contains_key(name) {
                return Err(format!("missing parameter '{name}'"));
            }
        }
        for (name, value) in params {
            let Some(def) = self.param_defs.get(name) else {
                return Err(format!("unknown parameter '{name}'"));
            };
            if !def.is_in_domain(value) {
                return Err(format!("value {value} is outside the domain of '{name}'"));
            }
        }
        Ok(())
    }

    /// Warps every value of `params` through its definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for a parameter name the experiment
    /// does not define, or whatever the definition's `warp_in` returns.
    pub fn warp_pt_in(
        &self,
        params: &BTreeMap<String, ParamValue>,
    ) -> Result<BTreeMap<String, Vec<f64>>> {
        params
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.def(name)?.warp_in(value)?)))
            .collect()
    }

    /// Decodes every coordinate vector of `coords` through its definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for a parameter name the experiment
    /// does not define, or whatever the definition's `warp_out` returns.
    pub fn warp_pt_out(
        &self,
        coords: &BTreeMap<String, Vec<f64>>,
    ) -> Result<BTreeMap<String, ParamValue>> {
        coords
            .iter()
            .map(|(name, c)| Ok((name.clone(), self.def(name)?.warp_out(c)?)))
            .collect()
    }

    fn def(&self, name: &str) -> Result<&Arc<dyn ParamDef>> {
        self.param_defs
            .get(name)
            .ok_or_else(|| Error::invalid_value(name, "not a parameter of this experiment"))
    }
}

fn better_unchecked(direction: Direction, a: Option<&Candidate>, b: Option<&Candidate>) -> bool {
    let Some(a) = a else {
        return false;
    };
    let Some(b) = b else {
        return true;
    };
    match (a.has_valid_result(), b.has_valid_result()) {
        (false, _) => false,
        (true, false) => true,
        (true, true) => match (a.result, b.result) {
            (Some(ra), Some(rb)) => direction.is_better(ra, rb),
            _ => false,
        },
    }
}

/// A builder for [`Experiment`] instances.
///
/// # Defaults
///
/// - Direction: [`Minimize`](Direction::Minimize)
/// - Notes: empty
/// - Id: a fresh random UUID in simple hex form
#[derive(Debug)]
pub struct ExperimentBuilder {
    name: String,
    notes: String,
    id: Option<String>,
    direction: Direction,
    param_defs: BTreeMap<String, Arc<dyn ParamDef>>,
    duplicate: Option<String>,
}

impl ExperimentBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: String::new(),
            id: None,
            direction: Direction::Minimize,
            param_defs: BTreeMap::new(),
            duplicate: None,
        }
    }

    /// Adds a parameter definition.
    #[must_use]
    pub fn param(self, name: impl Into<String>, def: impl ParamDef + 'static) -> Self {
        self.shared_param(name, Arc::new(def))
    }

    /// Adds an already shared parameter definition.
    #[must_use]
    pub fn shared_param(mut self, name: impl Into<String>, def: Arc<dyn ParamDef>) -> Self {
        let name = name.into();
        if self.param_defs.insert(name.clone(), def).is_some() {
            self.duplicate.get_or_insert(name);
        }
        self
    }

    /// Minimize results (the default).
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.direction = Direction::Minimize;
        self
    }

    /// Maximize results.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Sets the optimization direction explicitly.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Attaches free-text notes.
    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Uses `id` instead of a generated one.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builds the experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if no parameter was defined
    /// or a parameter name was given twice.
    pub fn build(self) -> Result<Experiment> {
        if let Some(name) = self.duplicate {
            return Err(Error::InvalidConfiguration(format!(
                "parameter '{name}' is defined more than once"
            )));
        }
        if self.param_defs.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "experiment '{}' has no parameters",
                self.name
            )));
        }
        let id = self
            .id
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        trace_info!(
            experiment = %self.name,
            id = %id,
            n_params = self.param_defs.len(),
            direction = ?self.direction,
            "experiment created"
        );
        Ok(Experiment {
            id,
            name: self.name,
            notes: self.notes,
            direction: self.direction,
            param_defs: self.param_defs,
            candidates_pending: Vec::new(),
            candidates_working: Vec::new(),
            candidates_finished: Vec::new(),
            best_candidate: None,
            last_update_time: Utc::now(),
        })
    }
}
