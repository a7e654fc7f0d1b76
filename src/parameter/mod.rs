//! Parameter definitions and their warping to the unit hypercube.
//!
//! Every parameter of an [`Experiment`](crate::Experiment) is described by a
//! [`ParamDef`]. Besides answering whether a native [`ParamValue`] belongs to
//! its domain, a definition provides a bijection between that domain and
//! `[0, 1]^k` (with `k =` [`warped_size`](ParamDef::warped_size)), so that
//! optimizers can work on uniform coordinates regardless of what the
//! parameter actually is.
//!
//! | Definition | Domain | `warped_size` |
//! |------------|--------|---------------|
//! | [`NominalParamDef`] | unordered finite set | number of values (one-hot) |
//! | [`OrdinalParamDef`] | ordered finite set | number of values (one-hot) |
//! | [`NumericParamDef`] | caller-supplied warping functions | 1 |
//! | [`MinMaxNumericParamDef`] | `[lower, upper]`, bounds optionally excluded | 1 |
//! | [`AsymptoticNumericParamDef`] | interval with one asymptotic border | 1 |
//! | [`PositionParamDef`] | finite set with explicit positions | 1 |
//! | [`FixedValueParamDef`] | numeric set positioned at its own values | 1 |
//! | [`EquidistantPositionParamDef`] | ordered set, evenly spaced | 1 |
//! | [`RangeParamDef`] | stepped sequence like `range(start, stop, step)` | 1 |
//!
//! # Example
//!
//! ```
//! use hypersearch::ParamValue;
//! use hypersearch::parameter::{MinMaxNumericParamDef, ParamDef};
//!
//! let lr = MinMaxNumericParamDef::new(0.0, 10.0).unwrap();
//! let warped = lr.warp_in(&ParamValue::Float(2.5)).unwrap();
//! assert_eq!(warped, vec![0.25]);
//! assert_eq!(lr.warp_out(&warped).unwrap(), ParamValue::Float(2.5));
//! ```

use core::cmp::Ordering;
use core::fmt;

use crate::error::{Error, Result};
use crate::param::ParamValue;

mod nominal;
mod numeric;
mod position;
#[cfg(feature = "serde")]
mod record;

pub use nominal::{NominalParamDef, OrdinalParamDef};
pub use numeric::{
    AsymptoticNumericParamDef, DEFAULT_EPSILON, MinMaxNumericParamDef, NumericParamDef,
};
pub use position::{
    EquidistantPositionParamDef, FixedValueParamDef, PositionParamDef, RangeParamDef,
};
#[cfg(feature = "serde")]
pub use record::ParamRecord;

/// The concrete kind of a [`ParamDef`].
///
/// Kinds form a small specialization lattice: a [`Range`](ParamKind::Range)
/// definition is also a fixed-value, position, ordinal and nominal definition.
/// Optimizers declare the kinds they support, and a definition is accepted if
/// its kind [`satisfies`](ParamKind::satisfies) any of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamKind {
    /// Unordered finite set.
    Nominal,
    /// Ordered finite set.
    Ordinal,
    /// Numeric parameter with arbitrary warping functions.
    Numeric,
    /// Numeric parameter with lower and upper bounds.
    MinMaxNumeric,
    /// Numeric parameter with one asymptotic border.
    AsymptoticNumeric,
    /// Finite set with explicit positions.
    Position,
    /// Numeric set positioned at its own values.
    FixedValue,
    /// Ordered set with evenly spaced positions.
    EquidistantPosition,
    /// Stepped numeric sequence.
    Range,
}

impl ParamKind {
    /// All kinds, leaves of the lattice last.
    pub const ALL: [ParamKind; 9] = [
        ParamKind::Nominal,
        ParamKind::Ordinal,
        ParamKind::Numeric,
        ParamKind::MinMaxNumeric,
        ParamKind::AsymptoticNumeric,
        ParamKind::Position,
        ParamKind::FixedValue,
        ParamKind::EquidistantPosition,
        ParamKind::Range,
    ];

    /// Returns the kind this one directly specializes, if any.
    #[must_use]
    pub fn parent(self) -> Option<ParamKind> {
        match self {
            ParamKind::Nominal | ParamKind::Numeric => None,
            ParamKind::Ordinal => Some(ParamKind::Nominal),
            ParamKind::Position => Some(ParamKind::Ordinal),
            ParamKind::FixedValue | ParamKind::EquidistantPosition => Some(ParamKind::Position),
            ParamKind::Range => Some(ParamKind::FixedValue),
            ParamKind::MinMaxNumeric | ParamKind::AsymptoticNumeric => Some(ParamKind::Numeric),
        }
    }

    /// Returns `true` if a definition of this kind can be used wherever
    /// `required` is expected.
    ///
    /// ```
    /// use hypersearch::parameter::ParamKind;
    ///
    /// assert!(ParamKind::Range.satisfies(ParamKind::Nominal));
    /// assert!(ParamKind::MinMaxNumeric.satisfies(ParamKind::Numeric));
    /// assert!(!ParamKind::Nominal.satisfies(ParamKind::Ordinal));
    /// ```
    #[must_use]
    pub fn satisfies(self, required: ParamKind) -> bool {
        let mut kind = Some(self);
        while let Some(k) = kind {
            if k == required {
                return true;
            }
            kind = k.parent();
        }
        false
    }

    /// The record tag used for this kind when serialized.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            ParamKind::Nominal => "NominalParamDef",
            ParamKind::Ordinal => "OrdinalParamDef",
            ParamKind::Numeric => "NumericParamDef",
            ParamKind::MinMaxNumeric => "MinMaxNumericParamDef",
            ParamKind::AsymptoticNumeric => "AsymptoticNumericParamDef",
            ParamKind::Position => "PositionParamDef",
            ParamKind::FixedValue => "FixedValueParamDef",
            ParamKind::EquidistantPosition => "EquidistantPositionParamDef",
            ParamKind::Range => "RangeParamDef",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A parameter domain together with its unit-hypercube warping.
///
/// Implementations must keep `warp_in` and `warp_out` mutually inverse:
/// `warp_out(warp_in(x)) == x` for every `x` in the domain and
/// `warp_in(warp_out(c)) == c` for every `c` in `[0, 1]^warped_size`, up to
/// floating-point tolerance and the clamping documented per definition.
///
/// Definitions are immutable after construction and shared between
/// experiment snapshots, hence the `Send + Sync` bound.
pub trait ParamDef: fmt::Debug + Send + Sync {
    /// Returns the concrete kind of this definition.
    fn kind(&self) -> ParamKind;

    /// Returns `true` if `value` belongs to this definition's domain.
    fn is_in_domain(&self, value: &ParamValue) -> bool;

    /// Maps a native value into `[0, 1]^warped_size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the value cannot be warped, e.g. it
    /// is not one of the listed values or not numeric.
    fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>>;

    /// Maps unit-hypercube coordinates back to a native value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WarpDimension`] if `coords.len() != warped_size()`.
    fn warp_out(&self, coords: &[f64]) -> Result<ParamValue>;

    /// The number of coordinates this definition occupies in the hypercube.
    fn warped_size(&self) -> usize;

    /// Distance between two native values.
    ///
    /// The default is the discrete metric: `0` for equal values, `1` otherwise.
    ///
    /// # Errors
    ///
    /// Definitions with a structured metric return [`Error::InvalidValue`]
    /// when either value lies outside the domain.
    fn distance(&self, a: &ParamValue, b: &ParamValue) -> Result<f64> {
        Ok(discrete_distance(a, b))
    }

    /// Compares two native values in this definition's order.
    ///
    /// Returns `Ok(None)` for unordered domains.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] when an ordered definition is asked to
    /// compare a value outside its domain.
    fn compare_values(&self, a: &ParamValue, b: &ParamValue) -> Result<Option<Ordering>> {
        let _ = (a, b);
        Ok(None)
    }

    /// Returns the serializable record of this definition.
    ///
    /// Definitions built from closures have no record and return `None`.
    #[cfg(feature = "serde")]
    fn to_record(&self) -> Option<ParamRecord> {
        None
    }
}

/// Discrete metric shared by unordered definitions.
pub(crate) fn discrete_distance(a: &ParamValue, b: &ParamValue) -> f64 {
    if a == b { 0.0 } else { 1.0 }
}

/// Fails with [`Error::WarpDimension`] unless `coords` has `expected` entries.
pub(crate) fn check_warp_len(expected: usize, coords: &[f64]) -> Result<()> {
    if coords.len() == expected {
        Ok(())
    } else {
        Err(Error::WarpDimension {
            expected,
            got: coords.len(),
        })
    }
}

/// Index of the first coordinate holding the maximum.
///
/// A NaN coordinate is rejected rather than silently losing every comparison.
pub(crate) fn first_argmax(def: &dyn ParamDef, coords: &[f64]) -> Result<usize> {
    reject_nan(def, coords)?;
    let mut best = 0;
    for (i, &c) in coords.iter().enumerate().skip(1) {
        if c > coords[best] {
            best = i;
        }
    }
    Ok(best)
}

/// Fails with [`Error::InvalidValue`] if any coordinate is NaN.
pub(crate) fn reject_nan(def: &dyn ParamDef, coords: &[f64]) -> Result<()> {
    if let Some(i) = coords.iter().position(|c| c.is_nan()) {
        return Err(Error::invalid_value(
            def.kind(),
            format!("coordinate {i} is NaN"),
        ));
    }
    Ok(())
}

/// Index of the first position closest to `target`.
pub(crate) fn nearest_position(positions: &[f64], target: f64) -> usize {
    let mut best = 0;
    for (i, &p) in positions.iter().enumerate().skip(1) {
        if (p - target).abs() < (positions[best] - target).abs() {
            best = i;
        }
    }
    best
}

/// Validates a value list shared by all set-based definitions.
pub(crate) fn check_value_list(values: &[ParamValue]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidConfiguration(
            "value list must not be empty".into(),
        ));
    }
    for (i, v) in values.iter().enumerate() {
        if contains_value(&values[..i], v) {
            return Err(Error::InvalidConfiguration(format!(
                "value list contains {v} more than once"
            )));
        }
    }
    Ok(())
}

/// Equality of listed values; `Int` and `Float` compare by number.
#[allow(clippy::float_cmp)]
pub(crate) fn same_value(a: &ParamValue, b: &ParamValue) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

pub(crate) fn contains_value(values: &[ParamValue], value: &ParamValue) -> bool {
    values.iter().any(|v| same_value(v, value))
}

/// Locates `value` in `values`, or fails with [`Error::InvalidValue`].
pub(crate) fn index_in(
    def: &dyn ParamDef,
    values: &[ParamValue],
    value: &ParamValue,
) -> Result<usize> {
    values
        .iter()
        .position(|v| same_value(v, value))
        .ok_or_else(|| Error::invalid_value(def.kind(), format!("{value} is not one of the listed values")))
}

/// Numeric view of `value`, or [`Error::InvalidValue`].
pub(crate) fn numeric_value(def: &dyn ParamDef, value: &ParamValue) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::invalid_value(def.kind(), format!("{value} is not numeric")))
}
