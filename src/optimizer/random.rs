//! Random search over the unit hypercube.

use std::collections::BTreeMap;

use super::{Optimizer, OptimizerConfig, check_experiment_supported};
use crate::candidate::Candidate;
use crate::error::Result;
use crate::experiment::Experiment;
use crate::parameter::ParamKind;

const NAME: &str = "RandomSearch";

/// The roots of the kind lattice, which together cover every definition.
const SUPPORTED: [ParamKind; 2] = [ParamKind::Nominal, ParamKind::Numeric];

/// An optimizer that ignores all results and samples uniformly.
///
/// Each proposal draws `warped_size` uniform coordinates per parameter and
/// decodes them with the definition's `warp_out`, so the sampling
/// distribution in the native domain is whatever the warping induces (e.g.
/// log-like for asymptotic parameters). It serves as a baseline and as the
/// default strategy behind a [`QueueBasedOptimizer`](super::QueueBasedOptimizer).
///
/// # Examples
///
/// ```
/// use hypersearch::parameter::RangeParamDef;
/// use hypersearch::{Experiment, Optimizer, OptimizerConfig, RandomSearch};
///
/// let exp = Experiment::builder("seeded")
///     .param("n", RangeParamDef::new(1, 10, 1).unwrap())
///     .build()
///     .unwrap();
///
/// // Same seed, same proposals.
/// let config = OptimizerConfig::default().seed(42);
/// let mut a = RandomSearch::new(exp.clone(), &config).unwrap();
/// let mut b = RandomSearch::new(exp, &config).unwrap();
/// let pa: Vec<_> = a.get_next_candidates(4).into_iter().map(|c| c.params).collect();
/// let pb: Vec<_> = b.get_next_candidates(4).into_iter().map(|c| c.params).collect();
/// assert_eq!(pa, pb);
/// ```
#[derive(Debug)]
pub struct RandomSearch {
    experiment: Experiment,
    rng: fastrand::Rng,
}

impl RandomSearch {
    /// Creates a random search bound to `experiment`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// if `config` is invalid.
    pub fn new(experiment: Experiment, config: &OptimizerConfig) -> Result<Self> {
        config.validate()?;
        check_experiment_supported(NAME, &experiment, &SUPPORTED)?;
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Ok(Self { experiment, rng })
    }

    fn propose(&mut self) -> Result<Candidate> {
        let mut params = BTreeMap::new();
        for (name, def) in self.experiment.param_defs() {
            let coords: Vec<f64> = (0..def.warped_size()).map(|_| self.rng.f64()).collect();
            params.insert(name.clone(), def.warp_out(&coords)?);
        }
        Ok(Candidate::new(params))
    }
}

impl Optimizer for RandomSearch {
    fn name(&self) -> &str {
        NAME
    }

    fn supported_param_types(&self) -> &[ParamKind] {
        &SUPPORTED
    }

    fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    fn update(&mut self, experiment: Experiment) -> Result<()> {
        check_experiment_supported(NAME, &experiment, &SUPPORTED)?;
        self.experiment = experiment;
        Ok(())
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn get_next_candidates(&mut self, n: usize) -> Vec<Candidate> {
        let mut proposals = Vec::with_capacity(n);
        for _ in 0..n {
            match self.propose() {
                Ok(c) => proposals.push(c),
                Err(e) => {
                    trace_warn!(error = %e, "random proposal failed");
                    break;
                }
            }
        }
        proposals
    }
}
