use core::cmp::Ordering;

use super::nominal::compare_by_index;
use super::{
    ParamDef, ParamKind, check_value_list, check_warp_len, contains_value, index_in,
    nearest_position, reject_nan,
};
use crate::error::{Error, Result};
use crate::param::ParamValue;

/// Upper limit on the number of values a [`RangeParamDef`] may generate.
const MAX_RANGE_VALUES: usize = 1_000_000;

/// A finite set of values, each placed at an explicit scalar position.
///
/// Positions are normalized onto `[0, 1]`. Decoding snaps a coordinate to the
/// value with the nearest position (first one on ties); coordinates below `0`
/// decode to the first listed value and above `1` to the last.
///
/// Values are ordered by their index in the list, while the distance between
/// two values is the absolute difference of their raw (unnormalized)
/// positions.
///
/// # Example
///
/// ```
/// use hypersearch::ParamValue;
/// use hypersearch::parameter::{ParamDef, PositionParamDef};
///
/// let def = PositionParamDef::new(["small", "medium", "large"], [1.0, 2.0, 5.0]).unwrap();
/// assert_eq!(def.warp_in(&"medium".into()).unwrap(), vec![0.25]);
/// assert_eq!(def.warp_out(&[0.7]).unwrap(), ParamValue::from("large"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PositionParamDef {
    values: Vec<ParamValue>,
    positions: Vec<f64>,
    min_position: f64,
    max_position: f64,
}

impl PositionParamDef {
    /// Creates a definition placing `values[i]` at `positions[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the value list is empty or
    /// holds duplicates, the two lists differ in length, a position is not
    /// finite, or two values share a position.
    #[allow(clippy::float_cmp)]
    pub fn new<I, V, P>(values: I, positions: P) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
        P: IntoIterator<Item = f64>,
    {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        let positions: Vec<f64> = positions.into_iter().collect();
        check_value_list(&values)?;
        if values.len() != positions.len() {
            return Err(Error::InvalidConfiguration(format!(
                "got {} values but {} positions",
                values.len(),
                positions.len()
            )));
        }
        if let Some(p) = positions.iter().find(|p| !p.is_finite()) {
            return Err(Error::InvalidConfiguration(format!(
                "positions must be finite numbers, got {p}"
            )));
        }
        let mut sorted = positions.clone();
        sorted.sort_by(f64::total_cmp);
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::InvalidConfiguration(format!(
                "position {} is shared by more than one value",
                pair[0]
            )));
        }
        let min_position = sorted[0];
        let max_position = sorted[sorted.len() - 1];
        Ok(Self {
            values,
            positions,
            min_position,
            max_position,
        })
    }

    /// The possible values, in declaration order.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    /// The raw position of each value.
    #[must_use]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    fn span(&self) -> f64 {
        self.max_position - self.min_position
    }
}

impl ParamDef for PositionParamDef {
    fn kind(&self) -> ParamKind {
        ParamKind::Position
    }

    fn is_in_domain(&self, value: &ParamValue) -> bool {
        contains_value(&self.values, value)
    }

    fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>> {
        let index = index_in(self, &self.values, value)?;
        if self.values.len() == 1 {
            return Ok(vec![0.0]);
        }
        Ok(vec![(self.positions[index] - self.min_position) / self.span()])
    }

    fn warp_out(&self, coords: &[f64]) -> Result<ParamValue> {
        check_warp_len(1, coords)?;
        reject_nan(self, coords)?;
        let w = coords[0];
        let index = if w > 1.0 {
            self.values.len() - 1
        } else if w < 0.0 {
            0
        } else {
            nearest_position(&self.positions, w * self.span() + self.min_position)
        };
        Ok(self.values[index].clone())
    }

    fn warped_size(&self) -> usize {
        1
    }

    fn distance(&self, a: &ParamValue, b: &ParamValue) -> Result<f64> {
        let ia = index_in(self, &self.values, a)?;
        let ib = index_in(self, &self.values, b)?;
        Ok((self.positions[ia] - self.positions[ib]).abs())
    }

    fn compare_values(&self, a: &ParamValue, b: &ParamValue) -> Result<Option<Ordering>> {
        compare_by_index(self, &self.values, a, b)
    }

    #[cfg(feature = "serde")]
    fn to_record(&self) -> Option<super::ParamRecord> {
        Some(super::ParamRecord::PositionParamDef {
            values: self.values.clone(),
            positions: self.positions.clone(),
        })
    }
}

/// Forwards the whole [`ParamDef`] surface to an inner [`PositionParamDef`],
/// overriding only the kind and the record.
macro_rules! delegate_to_positions {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl ParamDef for $ty {
            fn kind(&self) -> ParamKind {
                $kind
            }

            fn is_in_domain(&self, value: &ParamValue) -> bool {
                self.$field.is_in_domain(value)
            }

            fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>> {
                self.$field.warp_in(value)
            }

            fn warp_out(&self, coords: &[f64]) -> Result<ParamValue> {
                self.$field.warp_out(coords)
            }

            fn warped_size(&self) -> usize {
                1
            }

            fn distance(&self, a: &ParamValue, b: &ParamValue) -> Result<f64> {
                self.$field.distance(a, b)
            }

            fn compare_values(&self, a: &ParamValue, b: &ParamValue) -> Result<Option<Ordering>> {
                self.$field.compare_values(a, b)
            }

            #[cfg(feature = "serde")]
            fn to_record(&self) -> Option<super::ParamRecord> {
                Some(self.record())
            }
        }
    };
}

/// A set of numbers, each positioned at its own value.
///
/// # Example
///
/// ```
/// use hypersearch::ParamValue;
/// use hypersearch::parameter::{FixedValueParamDef, ParamDef};
///
/// let batch = FixedValueParamDef::new([16, 32, 64, 128]).unwrap();
/// assert_eq!(batch.warp_out(&[0.2]).unwrap(), ParamValue::Int(32));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FixedValueParamDef {
    positions: PositionParamDef,
}

impl FixedValueParamDef {
    /// Creates a definition over numeric `values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a value is not numeric, or
    /// the list is rejected by [`PositionParamDef::new`].
    pub fn new<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        let positions = values
            .iter()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    Error::InvalidConfiguration(format!("fixed value {v} is not numeric"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Self {
            positions: PositionParamDef::new(values, positions)?,
        })
    }

    /// The possible values, in declaration order.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        self.positions.values()
    }

    #[cfg(feature = "serde")]
    fn record(&self) -> super::ParamRecord {
        super::ParamRecord::FixedValueParamDef {
            values: self.values().to_vec(),
        }
    }
}

delegate_to_positions!(FixedValueParamDef, ParamKind::FixedValue, positions);

/// An ordered set of values spaced evenly over `[0, 1]`.
///
/// A single value sits at position `0`.
#[derive(Clone, Debug, PartialEq)]
pub struct EquidistantPositionParamDef {
    positions: PositionParamDef,
}

impl EquidistantPositionParamDef {
    /// Creates an equidistant definition; the list order is the position order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the list is empty or holds
    /// duplicates.
    #[allow(clippy::cast_precision_loss)]
    pub fn new<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        let last = values.len().saturating_sub(1).max(1) as f64;
        let positions: Vec<f64> = (0..values.len()).map(|i| i as f64 / last).collect();
        Ok(Self {
            positions: PositionParamDef::new(values, positions)?,
        })
    }

    /// The possible values, in order.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        self.positions.values()
    }

    #[cfg(feature = "serde")]
    fn record(&self) -> super::ParamRecord {
        super::ParamRecord::EquidistantPositionParamDef {
            values: self.values().to_vec(),
        }
    }
}

delegate_to_positions!(
    EquidistantPositionParamDef,
    ParamKind::EquidistantPosition,
    positions
);

/// A stepped numeric sequence in the manner of `range(start, stop, step)`.
///
/// Values are `start, start + step, start + 2 * step, ...` for as long as
/// their magnitude stays below `|stop|`. Integer ranges hold [`ParamValue::Int`]
/// values; float ranges (see [`RangeParamDef::float`]) hold
/// [`ParamValue::Float`] values. Each value is positioned at itself, like a
/// [`FixedValueParamDef`].
///
/// # Example
///
/// ```
/// use hypersearch::ParamValue;
/// use hypersearch::parameter::{ParamDef, RangeParamDef};
///
/// let layers = RangeParamDef::new(1, 6, 1).unwrap();
/// assert_eq!(layers.values().len(), 5);
/// assert!(layers.is_in_domain(&ParamValue::Int(5)));
/// assert!(!layers.is_in_domain(&ParamValue::Int(6)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RangeParamDef {
    start: f64,
    stop: f64,
    step: f64,
    ints: bool,
    fixed: FixedValueParamDef,
}

impl RangeParamDef {
    /// Creates an integer range `start, start + step, ...` bounded by `|stop|`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `step` is zero or no value
    /// is generated.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(start: i64, stop: i64, step: i64) -> Result<Self> {
        Self::from_parts(start as f64, stop as f64, step as f64, true)
    }

    /// Creates the integer range `0, 1, ..., stop - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `stop` is zero.
    pub fn up_to(stop: i64) -> Result<Self> {
        Self::new(0, stop, 1)
    }

    /// Creates a floating-point range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if an argument is not finite,
    /// `step` is zero, or no value is generated.
    pub fn float(start: f64, stop: f64, step: f64) -> Result<Self> {
        Self::from_parts(start, stop, step, false)
    }

    /// Builds a range from its recorded parts.
    ///
    /// With `ints` set, `start`, `stop` and `step` must be integral.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for non-finite or (with
    /// `ints`) non-integral arguments, a zero step, an empty sequence, or a
    /// sequence longer than one million values.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_parts(start: f64, stop: f64, step: f64, ints: bool) -> Result<Self> {
        for (name, v) in [("start", start), ("stop", stop), ("step", step)] {
            if !v.is_finite() {
                return Err(Error::InvalidConfiguration(format!(
                    "range {name} must be a finite number, got {v}"
                )));
            }
            if ints && v.fract() != 0.0 {
                return Err(Error::InvalidConfiguration(format!(
                    "range {name} must be an integer for an integer range, got {v}"
                )));
            }
        }
        if step == 0.0 {
            return Err(Error::InvalidConfiguration("range step must not be zero".into()));
        }

        let mut values = Vec::new();
        let mut current = start;
        while current.abs() < stop.abs() {
            if values.len() >= MAX_RANGE_VALUES {
                return Err(Error::InvalidConfiguration(format!(
                    "range({start}, {stop}, {step}) generates more than {MAX_RANGE_VALUES} values"
                )));
            }
            values.push(if ints {
                ParamValue::Int(current as i64)
            } else {
                ParamValue::Float(current)
            });
            current += step;
        }
        if values.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "range({start}, {stop}, {step}) generates no values"
            )));
        }

        Ok(Self {
            start,
            stop,
            step,
            ints,
            fixed: FixedValueParamDef::new(values)?,
        })
    }

    /// The first value of the sequence.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// The exclusive magnitude limit.
    #[must_use]
    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// The increment between consecutive values.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Whether the range holds integers.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.ints
    }

    /// The generated values, in sequence order.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        self.fixed.values()
    }

    #[cfg(feature = "serde")]
    fn record(&self) -> super::ParamRecord {
        super::ParamRecord::RangeParamDef {
            start: self.start,
            stop: self.stop,
            step: self.step,
            ints: self.ints,
        }
    }
}

delegate_to_positions!(RangeParamDef, ParamKind::Range, fixed);
