#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Optimization core for hyperparameter search: parameter spaces warped onto
//! the unit hypercube, an experiment state machine tracking every candidate,
//! and an optimizer contract whose implementations can run out-of-line
//! behind a pair of queues.
//!
//! # Getting Started
//!
//! ```
//! use hypersearch::prelude::*;
//!
//! let mut exp = Experiment::builder("quadratic")
//!     .param("x", MinMaxNumericParamDef::new(-10.0, 10.0).unwrap())
//!     .minimize()
//!     .build()
//!     .unwrap();
//!
//! let mut opt = RandomSearch::new(exp.clone(), &OptimizerConfig::default().seed(1)).unwrap();
//! for _ in 0..20 {
//!     for mut candidate in opt.get_next_candidates(1) {
//!         let x = candidate.get("x").and_then(ParamValue::as_f64).unwrap();
//!         candidate.set_result((x - 3.0).powi(2));
//!         exp.add_finished(candidate).unwrap();
//!     }
//!     opt.update(exp.clone()).unwrap();
//! }
//!
//! let best = exp.best_candidate().unwrap();
//! println!("best x = {}, f(x) = {:?}", best.get("x").unwrap(), best.result);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`ParamDef`](parameter::ParamDef) | A parameter domain plus its bijection to `[0, 1]^k`. |
//! | [`Candidate`] | One parameter assignment with its result and failure flag. |
//! | [`Experiment`] | The parameter space and the pending / working / finished partitions. |
//! | [`Optimizer`] | A strategy proposing new candidates from an experiment snapshot. |
//! | [`QueueBasedOptimizer`] | Runs any optimizer on a worker thread behind non-blocking queues. |
//! | [`Direction`] | Whether lower or higher results are better. |
//!
//! # Parameter Definitions
//!
//! | Definition | Domain | Warping |
//! |------------|--------|---------|
//! | [`NominalParamDef`](parameter::NominalParamDef) | unordered set | one-hot |
//! | [`OrdinalParamDef`](parameter::OrdinalParamDef) | ordered set | one-hot |
//! | [`NumericParamDef`](parameter::NumericParamDef) | caller-defined | caller-defined |
//! | [`MinMaxNumericParamDef`](parameter::MinMaxNumericParamDef) | bounded interval | linear |
//! | [`AsymptoticNumericParamDef`](parameter::AsymptoticNumericParamDef) | interval with one asymptote | logarithmic |
//! | [`PositionParamDef`](parameter::PositionParamDef) | set with explicit positions | normalized position |
//! | [`FixedValueParamDef`](parameter::FixedValueParamDef) | numeric set | normalized value |
//! | [`EquidistantPositionParamDef`](parameter::EquidistantPositionParamDef) | ordered set | evenly spaced |
//! | [`RangeParamDef`](parameter::RangeParamDef) | stepped sequence | normalized value |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on public types, [`ParamRecord`](parameter::ParamRecord), [`Experiment::save`]/[`Experiment::load`] | on |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at experiment transitions and backend steps | on |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

mod candidate;
mod error;
mod experiment;
pub mod optimizer;
mod param;
pub mod parameter;
mod types;

pub use candidate::{Candidate, CandidateId};
pub use error::{Error, Result};
#[cfg(feature = "serde")]
pub use experiment::ExperimentSnapshot;
pub use experiment::{Experiment, ExperimentBuilder};
pub use optimizer::{
    FailedTreatment, Optimizer, OptimizerConfig, QueueBasedOptimizer, RandomSearch,
};
pub use param::ParamValue;
pub use types::{CandidateState, Direction};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use hypersearch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::candidate::{Candidate, CandidateId};
    pub use crate::error::{Error, Result};
    #[cfg(feature = "serde")]
    pub use crate::experiment::ExperimentSnapshot;
    pub use crate::experiment::{Experiment, ExperimentBuilder};
    pub use crate::optimizer::{
        BackendState, FailedTreatment, Optimizer, OptimizerConfig, QueueBackend,
        QueueBasedOptimizer, RandomSearch,
    };
    pub use crate::param::ParamValue;
    #[cfg(feature = "serde")]
    pub use crate::parameter::ParamRecord;
    pub use crate::parameter::{
        AsymptoticNumericParamDef, EquidistantPositionParamDef, FixedValueParamDef,
        MinMaxNumericParamDef, NominalParamDef, NumericParamDef, OrdinalParamDef, ParamDef,
        ParamKind, PositionParamDef, RangeParamDef,
    };
    pub use crate::types::{CandidateState, Direction};
}
