//! Serializable records of parameter definitions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    AsymptoticNumericParamDef, EquidistantPositionParamDef, FixedValueParamDef,
    MinMaxNumericParamDef, NominalParamDef, OrdinalParamDef, ParamDef, PositionParamDef,
    RangeParamDef,
};
use crate::error::Result;
use crate::param::ParamValue;

/// The structural dump of a [`ParamDef`], tagged by its type name.
///
/// ```
/// use hypersearch::parameter::ParamRecord;
///
/// let json = r#"{"type": "MinMaxNumericParamDef", "lower_bound": 0.0, "upper_bound": 1.0}"#;
/// let record: ParamRecord = serde_json::from_str(json).unwrap();
/// let def = record.build().unwrap();
/// assert_eq!(def.warped_size(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParamRecord {
    /// See [`NominalParamDef`].
    NominalParamDef {
        /// The possible values.
        values: Vec<ParamValue>,
    },
    /// See [`OrdinalParamDef`].
    OrdinalParamDef {
        /// The possible values, lowest rank first.
        values: Vec<ParamValue>,
    },
    /// See [`MinMaxNumericParamDef`].
    MinMaxNumericParamDef {
        /// The lower bound.
        lower_bound: f64,
        /// The upper bound.
        upper_bound: f64,
        /// Whether the lower bound belongs to the domain.
        #[serde(default = "included")]
        include_lower: bool,
        /// Whether the upper bound belongs to the domain.
        #[serde(default = "included")]
        include_upper: bool,
        /// Inward offset of excluded bounds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        epsilon: Option<f64>,
    },
    /// See [`AsymptoticNumericParamDef`].
    AsymptoticNumericParamDef {
        /// The border approached asymptotically.
        asymptotic_border: f64,
        /// The fixed border.
        border: f64,
    },
    /// See [`PositionParamDef`].
    PositionParamDef {
        /// The possible values.
        values: Vec<ParamValue>,
        /// The position of each value.
        positions: Vec<f64>,
    },
    /// See [`FixedValueParamDef`].
    FixedValueParamDef {
        /// The possible numeric values.
        values: Vec<ParamValue>,
    },
    /// See [`EquidistantPositionParamDef`].
    EquidistantPositionParamDef {
        /// The possible values, in order.
        values: Vec<ParamValue>,
    },
    /// See [`RangeParamDef`].
    RangeParamDef {
        /// The first value.
        start: f64,
        /// The exclusive magnitude limit.
        stop: f64,
        /// The increment.
        #[serde(default = "unit_step")]
        step: f64,
        /// Whether the range holds integers.
        #[serde(default = "included")]
        ints: bool,
    },
}

fn included() -> bool {
    true
}

fn unit_step() -> f64 {
    1.0
}

impl ParamRecord {
    /// Rebuilds the definition through its validating constructor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// if the recorded fields are rejected by the constructor.
    pub fn build(&self) -> Result<Arc<dyn ParamDef>> {
        let def: Arc<dyn ParamDef> = match self {
            ParamRecord::NominalParamDef { values } => {
                Arc::new(NominalParamDef::new(values.clone())?)
            }
            ParamRecord::OrdinalParamDef { values } => {
                Arc::new(OrdinalParamDef::new(values.clone())?)
            }
            ParamRecord::MinMaxNumericParamDef {
                lower_bound,
                upper_bound,
                include_lower,
                include_upper,
                epsilon,
            } => Arc::new(MinMaxNumericParamDef::with_bounds(
                *lower_bound,
                *upper_bound,
                *include_lower,
                *include_upper,
                *epsilon,
            )?),
            ParamRecord::AsymptoticNumericParamDef {
                asymptotic_border,
                border,
            } => Arc::new(AsymptoticNumericParamDef::new(*asymptotic_border, *border)?),
            ParamRecord::PositionParamDef { values, positions } => Arc::new(
                PositionParamDef::new(values.clone(), positions.iter().copied())?,
            ),
            ParamRecord::FixedValueParamDef { values } => {
                Arc::new(FixedValueParamDef::new(values.clone())?)
            }
            ParamRecord::EquidistantPositionParamDef { values } => {
                Arc::new(EquidistantPositionParamDef::new(values.clone())?)
            }
            ParamRecord::RangeParamDef {
                start,
                stop,
                step,
                ints,
            } => Arc::new(RangeParamDef::from_parts(*start, *stop, *step, *ints)?),
        };
        Ok(def)
    }
}
