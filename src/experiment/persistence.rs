use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Experiment;
use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::parameter::ParamRecord;

/// The current snapshot schema version.
const SNAPSHOT_VERSION: u32 = 1;

/// A serializable dump of an [`Experiment`].
///
/// The stored `best_candidate` is informational only: restoring an
/// experiment recomputes it from the finished candidates.
///
/// # Schema versioning
///
/// The `version` field enables future schema evolution without breaking
/// existing files. The current version is `1`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExperimentSnapshot {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The experiment name.
    pub name: String,
    /// The record of every parameter definition, keyed by name.
    pub parameter_definitions: BTreeMap<String, ParamRecord>,
    /// Whether lower results are better.
    pub minimization_problem: bool,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// The experiment id.
    pub exp_id: String,
    /// Candidates waiting for evaluation.
    #[serde(default)]
    pub candidates_pending: Vec<Candidate>,
    /// Candidates being evaluated.
    #[serde(default)]
    pub candidates_working: Vec<Candidate>,
    /// Finished candidates.
    #[serde(default)]
    pub candidates_finished: Vec<Candidate>,
    /// The best finished candidate at the time of the dump.
    #[serde(default)]
    pub best_candidate: Option<Candidate>,
    /// When any candidate last changed state.
    pub last_update_time: DateTime<Utc>,
}

impl Experiment {
    /// Captures the experiment as a serializable snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a parameter definition has
    /// no record, e.g. a closure-backed
    /// [`NumericParamDef`](crate::parameter::NumericParamDef).
    pub fn to_snapshot(&self) -> Result<ExperimentSnapshot> {
        let parameter_definitions = self
            .param_defs
            .iter()
            .map(|(name, def)| {
                def.to_record()
                    .map(|record| (name.clone(), record))
                    .ok_or_else(|| {
                        Error::InvalidConfiguration(format!(
                            "parameter '{name}' ({}) cannot be serialized",
                            def.kind()
                        ))
                    })
            })
            .collect::<Result<_>>()?;
        Ok(ExperimentSnapshot {
            version: SNAPSHOT_VERSION,
            name: self.name.clone(),
            parameter_definitions,
            minimization_problem: self.is_minimization(),
            notes: self.notes.clone(),
            exp_id: self.id.clone(),
            candidates_pending: self.candidates_pending.clone(),
            candidates_working: self.candidates_working.clone(),
            candidates_finished: self.candidates_finished.clone(),
            best_candidate: self.best_candidate.clone(),
            last_update_time: self.last_update_time,
        })
    }

    /// Restores an experiment from a snapshot.
    ///
    /// Every definition is rebuilt through its validating constructor, every
    /// candidate is checked against the rebuilt parameter space, and the best
    /// candidate is recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] for an unknown schema version,
    /// [`Error::InvalidConfiguration`] if a definition is rejected, and
    /// [`Error::InvalidCandidate`] if a stored candidate does not fit the
    /// parameter space or appears in more than one partition.
    pub fn from_snapshot(snapshot: ExperimentSnapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Storage(format!(
                "unsupported experiment snapshot version {}",
                snapshot.version
            )));
        }
        let mut builder = Experiment::builder(snapshot.name)
            .id(snapshot.exp_id)
            .notes(snapshot.notes)
            .direction(crate::types::Direction::from_minimization(
                snapshot.minimization_problem,
            ));
        for (name, record) in &snapshot.parameter_definitions {
            builder = builder.shared_param(name.clone(), record.build()?);
        }
        let mut experiment = builder.build()?;

        let mut seen = HashSet::new();
        for list in [
            &snapshot.candidates_pending,
            &snapshot.candidates_working,
            &snapshot.candidates_finished,
        ] {
            for c in list {
                experiment.check_candidate(c)?;
                if !seen.insert(c.id()) {
                    return Err(Error::InvalidCandidate(format!(
                        "candidate {} appears in more than one partition",
                        c.id()
                    )));
                }
            }
        }
        experiment.candidates_pending = snapshot.candidates_pending;
        experiment.candidates_working = snapshot.candidates_working;
        experiment.candidates_finished = snapshot.candidates_finished;
        experiment.last_update_time = snapshot.last_update_time;
        experiment.update_best();
        Ok(experiment)
    }

    /// Saves the experiment to a JSON file.
    ///
    /// The file is written to a temporary sibling first and then renamed
    /// into place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the experiment cannot be
    /// snapshotted and [`Error::Storage`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.to_snapshot()?;

        let parent = path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        let file = std::fs::File::create(&tmp_path).map_err(storage_error)?;
        serde_json::to_writer_pretty(file, &snapshot).map_err(storage_error)?;
        std::fs::rename(&tmp_path, path).map_err(storage_error)?;
        trace_debug!(experiment = %self.name, path = %path.display(), "experiment saved");
        Ok(())
    }

    /// Loads an experiment saved with [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the file cannot be read or parsed, and
    /// any error of [`from_snapshot`](Self::from_snapshot).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(storage_error)?;
        let reader = std::io::BufReader::new(file);
        let snapshot: ExperimentSnapshot =
            serde_json::from_reader(reader).map_err(storage_error)?;
        Self::from_snapshot(snapshot)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn storage_error(e: impl core::fmt::Display) -> Error {
    Error::Storage(e.to_string())
}
