//! The optimizer contract and its construction configuration.
//!
//! An [`Optimizer`] is a stateful strategy bound to one [`Experiment`]
//! snapshot. It proposes new candidates on request and is refreshed with a
//! newer snapshot through [`update`](Optimizer::update), which re-checks that
//! every parameter definition is of a supported [`ParamKind`].
//!
//! | Type | Role |
//! |------|------|
//! | [`Optimizer`] | The contract every search strategy implements. |
//! | [`OptimizerConfig`] | Failed-candidate treatment, buffering and polling settings, seed. |
//! | [`FailedTreatment`] | How failed candidates are presented to a model. |
//! | [`RandomSearch`] | Uniform sampling of the unit hypercube; supports every definition. |
//! | [`QueueBasedOptimizer`] | Runs any optimizer on a worker thread behind two queues. |

use core::time::Duration;

use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::experiment::Experiment;
use crate::parameter::{ParamDef, ParamKind};
use crate::types::Direction;

pub mod queue;
pub mod random;

pub use queue::{BackendMessage, BackendState, QueueBackend, QueueBasedOptimizer};
pub use random::RandomSearch;

/// Result substituted for failed candidates under [`FailedTreatment::FixedValue`]
/// when no explicit value was configured, for minimization problems. The
/// maximization default is its negation.
pub const DEFAULT_FAILED_VALUE: f64 = 1e6;

/// A strategy proposing new candidates for an experiment.
///
/// Implementations hold their own copy of the experiment they were built
/// for; callers hand them newer snapshots through [`update`](Self::update).
///
/// # Example
///
/// ```
/// use hypersearch::parameter::MinMaxNumericParamDef;
/// use hypersearch::{Experiment, Optimizer, OptimizerConfig, RandomSearch};
///
/// let exp = Experiment::builder("demo")
///     .param("x", MinMaxNumericParamDef::new(-1.0, 1.0).unwrap())
///     .build()
///     .unwrap();
/// let mut opt = RandomSearch::new(exp.clone(), &OptimizerConfig::default().seed(7)).unwrap();
///
/// let proposals = opt.get_next_candidates(3);
/// assert_eq!(proposals.len(), 3);
/// assert!(proposals.iter().all(|c| exp.check_candidate(c).is_ok()));
/// ```
pub trait Optimizer: Send {
    /// A short human-readable name, used in errors and logs.
    fn name(&self) -> &str;

    /// The parameter kinds this optimizer can handle.
    ///
    /// A definition is supported if its kind
    /// [`satisfies`](ParamKind::satisfies) any listed kind.
    fn supported_param_types(&self) -> &[ParamKind];

    /// The experiment snapshot the optimizer currently works from.
    fn experiment(&self) -> &Experiment;

    /// Replaces the held experiment snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedParameterType`] if the new snapshot holds
    /// a definition outside [`supported_param_types`](Self::supported_param_types);
    /// the previous snapshot is kept in that case.
    fn update(&mut self, experiment: Experiment) -> Result<()>;

    /// Proposes up to `n` new candidates.
    ///
    /// An empty vector means no proposal is ready right now; it is not an
    /// error.
    fn get_next_candidates(&mut self, n: usize) -> Vec<Candidate>;

    /// Releases any resources held by the optimizer.
    ///
    /// Must be idempotent.
    fn exit(&mut self) {}
}

/// Returns `true` if `def` is of a kind covered by `supported`.
#[must_use]
pub fn is_supported_param_type(def: &dyn ParamDef, supported: &[ParamKind]) -> bool {
    let kind = def.kind();
    supported.iter().any(|&required| kind.satisfies(required))
}

/// Checks every definition of `experiment` against `supported`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedParameterType`] naming the first unsupported
/// parameter.
pub fn check_experiment_supported(
    optimizer: &str,
    experiment: &Experiment,
    supported: &[ParamKind],
) -> Result<()> {
    for (name, def) in experiment.param_defs() {
        if !is_supported_param_type(def.as_ref(), supported) {
            return Err(Error::UnsupportedParameterType {
                optimizer: optimizer.to_owned(),
                param: name.clone(),
                kind: def.kind(),
            });
        }
    }
    Ok(())
}

/// How failed (or result-less) finished candidates are presented to a model.
///
/// Under `serde`, a treatment is written either as a bare mode string
/// (`"ignore"`, `"fixed_value"`, `"worst_mult"`) or as a `[mode, value]`
/// pair such as `["worst_mult", 3.0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "serde_repr::TreatmentRepr", into = "serde_repr::TreatmentRepr")
)]
pub enum FailedTreatment {
    /// Leave failed candidates out.
    Ignore,
    /// Substitute a constant. `None` picks [`DEFAULT_FAILED_VALUE`] skewed
    /// against the optimization direction.
    FixedValue(Option<f64>),
    /// Substitute `worst + multiplier * (worst - best)` over the valid results.
    WorstMult(f64),
}

impl Default for FailedTreatment {
    fn default() -> Self {
        FailedTreatment::WorstMult(2.0)
    }
}

impl FailedTreatment {
    /// The default substitute value for `direction`: a large result when
    /// minimizing, a large negative one when maximizing.
    #[must_use]
    pub fn fixed_value_for(direction: Direction) -> f64 {
        match direction {
            Direction::Minimize => DEFAULT_FAILED_VALUE,
            Direction::Maximize => -DEFAULT_FAILED_VALUE,
        }
    }

    /// Maps the finished candidates of `experiment` to the result a model
    /// should consume, applying this treatment to failed ones.
    ///
    /// Candidates with a valid result keep it. Under
    /// [`WorstMult`](Self::WorstMult), only finite results span the worst and
    /// best, and failed candidates are left out while no finite result exists
    /// yet or the substitute would overflow.
    ///
    /// ```
    /// use hypersearch::parameter::NominalParamDef;
    /// use hypersearch::{Candidate, Experiment, FailedTreatment, ParamValue};
    ///
    /// let mut exp = Experiment::builder("t")
    ///     .param("c", NominalParamDef::new(["a", "b"]).unwrap())
    ///     .build()
    ///     .unwrap();
    /// let c = |v: &str| Candidate::new([("c", ParamValue::from(v))]);
    /// exp.add_finished(c("a").with_result(1.0)).unwrap();
    /// exp.add_finished(c("b").with_result(3.0)).unwrap();
    /// exp.add_finished(c("a").failed()).unwrap();
    ///
    /// let results: Vec<f64> = FailedTreatment::WorstMult(2.0)
    ///     .effective_results(&exp)
    ///     .into_iter()
    ///     .map(|(_, r)| r)
    ///     .collect();
    /// assert_eq!(results, vec![1.0, 3.0, 7.0]);
    /// ```
    #[must_use]
    pub fn effective_results<'a>(&self, experiment: &'a Experiment) -> Vec<(&'a Candidate, f64)> {
        let direction = experiment.direction();
        let finished = experiment.candidates_finished();

        let substitute = match *self {
            FailedTreatment::Ignore => None,
            FailedTreatment::FixedValue(value) => {
                Some(value.unwrap_or_else(|| Self::fixed_value_for(direction)))
            }
            FailedTreatment::WorstMult(multiplier) => {
                let valid = finished
                    .iter()
                    .filter(|c| c.has_valid_result())
                    .filter_map(|c| c.result)
                    .filter(|r| r.is_finite());
                let mut extremes: Option<(f64, f64)> = None;
                for r in valid {
                    extremes = Some(match extremes {
                        None => (r, r),
                        Some((lo, hi)) => (lo.min(r), hi.max(r)),
                    });
                }
                extremes
                    .map(|(lo, hi)| {
                        let (best, worst) = match direction {
                            Direction::Minimize => (lo, hi),
                            Direction::Maximize => (hi, lo),
                        };
                        worst + multiplier * (worst - best)
                    })
                    .filter(|s| s.is_finite())
            }
        };

        finished
            .iter()
            .filter_map(|c| match c.result {
                Some(r) if c.has_valid_result() => Some((c, r)),
                _ => substitute.map(|s| (c, s)),
            })
            .collect()
    }
}

/// Construction configuration shared by all optimizers.
///
/// # Defaults
///
/// - `treat_failed`: [`WorstMult(2.0)`](FailedTreatment::WorstMult)
/// - `min_candidates`: 5
/// - `update_time`: 100 ms
/// - `seed`: none (entropy-seeded)
///
/// Under `serde`, every field is optional and `update_time` is given in
/// seconds:
///
/// ```
/// use hypersearch::{FailedTreatment, OptimizerConfig};
///
/// let config: OptimizerConfig =
///     serde_json::from_str(r#"{"treat_failed": ["fixed_value", 50.0], "update_time": 0.5}"#)
///         .unwrap();
/// assert_eq!(config.treat_failed, FailedTreatment::FixedValue(Some(50.0)));
/// assert_eq!(config.update_time.as_millis(), 500);
/// assert_eq!(config.min_candidates, 5);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConfig {
    /// How failed candidates are treated.
    pub treat_failed: FailedTreatment,
    /// Low-water mark of buffered proposals in a queue backend.
    pub min_candidates: usize,
    /// Polling interval of a queue backend.
    #[cfg_attr(feature = "serde", serde(with = "serde_repr::seconds"))]
    pub update_time: Duration,
    /// Seed for optimizers that draw random numbers.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            treat_failed: FailedTreatment::default(),
            min_candidates: 5,
            update_time: Duration::from_millis(100),
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Sets the failed-candidate treatment.
    #[must_use]
    pub fn treat_failed(mut self, treat_failed: FailedTreatment) -> Self {
        self.treat_failed = treat_failed;
        self
    }

    /// Sets the low-water mark of buffered proposals.
    #[must_use]
    pub fn min_candidates(mut self, min_candidates: usize) -> Self {
        self.min_candidates = min_candidates;
        self
    }

    /// Sets the queue backend's polling interval.
    #[must_use]
    pub fn update_time(mut self, update_time: Duration) -> Self {
        self.update_time = update_time;
        self
    }

    /// Seeds the optimizer's random number generator.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the configuration for values no optimizer can work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `min_candidates` is zero or
    /// a treatment value is not finite.
    pub fn validate(&self) -> Result<()> {
        if self.min_candidates == 0 {
            return Err(Error::InvalidConfiguration(
                "min_candidates must be at least 1".into(),
            ));
        }
        let value = match self.treat_failed {
            FailedTreatment::Ignore | FailedTreatment::FixedValue(None) => None,
            FailedTreatment::FixedValue(Some(v)) | FailedTreatment::WorstMult(v) => Some(v),
        };
        if let Some(v) = value
            && !v.is_finite()
        {
            return Err(Error::InvalidConfiguration(format!(
                "failed-candidate treatment value must be finite, got {v}"
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_repr {
    use serde::{Deserialize, Serialize};

    use super::FailedTreatment;

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    pub(super) enum TreatmentRepr {
        Mode(String),
        WithValue(String, f64),
    }

    impl TryFrom<TreatmentRepr> for FailedTreatment {
        type Error = String;

        fn try_from(repr: TreatmentRepr) -> Result<Self, Self::Error> {
            match repr {
                TreatmentRepr::Mode(mode) => match mode.as_str() {
                    "ignore" => Ok(FailedTreatment::Ignore),
                    "fixed_value" => Ok(FailedTreatment::FixedValue(None)),
                    "worst_mult" => Ok(FailedTreatment::default()),
                    other => Err(format!("unknown failed-candidate treatment '{other}'")),
                },
                TreatmentRepr::WithValue(mode, value) => match mode.as_str() {
                    "fixed_value" => Ok(FailedTreatment::FixedValue(Some(value))),
                    "worst_mult" => Ok(FailedTreatment::WorstMult(value)),
                    "ignore" => Err("treatment 'ignore' takes no value".into()),
                    other => Err(format!("unknown failed-candidate treatment '{other}'")),
                },
            }
        }
    }

    impl From<FailedTreatment> for TreatmentRepr {
        fn from(treatment: FailedTreatment) -> Self {
            match treatment {
                FailedTreatment::Ignore => TreatmentRepr::Mode("ignore".into()),
                FailedTreatment::FixedValue(None) => TreatmentRepr::Mode("fixed_value".into()),
                FailedTreatment::FixedValue(Some(v)) => {
                    TreatmentRepr::WithValue("fixed_value".into(), v)
                }
                FailedTreatment::WorstMult(m) => TreatmentRepr::WithValue("worst_mult".into(), m),
            }
        }
    }

    pub(super) mod seconds {
        use core::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer, de};

        #[allow(clippy::trivially_copy_pass_by_ref)]
        pub(crate) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_f64(d.as_secs_f64())
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
            let secs = f64::deserialize(d)?;
            Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
        }
    }
}
