use core::cmp::Ordering;
use core::fmt;
use std::sync::Arc;

use super::{ParamDef, ParamKind, check_warp_len, numeric_value};
use crate::error::{Error, Result};
use crate::param::ParamValue;

/// Default tolerance used to exclude a bound: ten times the machine epsilon.
pub const DEFAULT_EPSILON: f64 = 10.0 * f64::EPSILON;

type WarpFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A numeric parameter defined by a pair of caller-supplied warping functions.
///
/// `warping_in` must map the domain onto `[0, 1]` and `warping_out` must be
/// its inverse. A value is in the domain iff it warps into `[0, 1]`.
///
/// This definition cannot be serialized, since its behavior lives in closures.
///
/// # Example
///
/// ```
/// use hypersearch::ParamValue;
/// use hypersearch::parameter::{NumericParamDef, ParamDef};
///
/// // Percentages between 0 and 100.
/// let pct = NumericParamDef::new(|x| x / 100.0, |w| w * 100.0);
/// assert!(pct.is_in_domain(&ParamValue::Float(42.0)));
/// assert!(!pct.is_in_domain(&ParamValue::Float(142.0)));
/// ```
#[derive(Clone)]
pub struct NumericParamDef {
    warping_in: WarpFn,
    warping_out: WarpFn,
}

impl NumericParamDef {
    /// Creates a numeric definition from a forward and an inverse warping.
    #[must_use]
    pub fn new<I, O>(warping_in: I, warping_out: O) -> Self
    where
        I: Fn(f64) -> f64 + Send + Sync + 'static,
        O: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            warping_in: Arc::new(warping_in),
            warping_out: Arc::new(warping_out),
        }
    }
}

impl fmt::Debug for NumericParamDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericParamDef").finish_non_exhaustive()
    }
}

impl ParamDef for NumericParamDef {
    fn kind(&self) -> ParamKind {
        ParamKind::Numeric
    }

    fn is_in_domain(&self, value: &ParamValue) -> bool {
        value
            .as_f64()
            .is_some_and(|x| (0.0..=1.0).contains(&(self.warping_in)(x)))
    }

    fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>> {
        let x = numeric_value(self, value)?;
        Ok(vec![(self.warping_in)(x)])
    }

    fn warp_out(&self, coords: &[f64]) -> Result<ParamValue> {
        check_warp_len(1, coords)?;
        Ok(ParamValue::Float((self.warping_out)(coords[0])))
    }

    fn warped_size(&self) -> usize {
        1
    }

    fn distance(&self, a: &ParamValue, b: &ParamValue) -> Result<f64> {
        numeric_distance(self, a, b)
    }

    fn compare_values(&self, a: &ParamValue, b: &ParamValue) -> Result<Option<Ordering>> {
        numeric_compare(self, a, b)
    }
}

/// A numeric parameter between a lower and an upper bound.
///
/// Either bound may be excluded. Exclusion does not add strict comparisons to
/// the warping: the bound is moved inward by `epsilon` (at least one ulp), and
/// both warping directions snap onto that effective interval. Excluding the
/// upper bound of `[0, 10]` therefore makes `warp_in(10)` land strictly below
/// `1`, and `warp_out([1.0])` decode to a value strictly below `10`.
///
/// # Example
///
/// ```
/// use hypersearch::ParamValue;
/// use hypersearch::parameter::{MinMaxNumericParamDef, ParamDef};
///
/// let def = MinMaxNumericParamDef::with_bounds(0.0, 10.0, true, false, None).unwrap();
/// assert!(!def.is_in_domain(&ParamValue::Float(10.0)));
/// assert!(def.warp_in(&ParamValue::Float(10.0)).unwrap()[0] < 1.0);
/// let top = def.warp_out(&[1.0]).unwrap().as_f64().unwrap();
/// assert!(top < 10.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxNumericParamDef {
    lower: f64,
    upper: f64,
    include_lower: bool,
    include_upper: bool,
    epsilon: f64,
    effective_lower: f64,
    effective_upper: f64,
}

impl MinMaxNumericParamDef {
    /// Creates a definition over the closed interval `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a bound is not finite or
    /// `lower >= upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        Self::with_bounds(lower, upper, true, true, None)
    }

    /// Creates a definition with explicit bound inclusion.
    ///
    /// `epsilon` defaults to [`DEFAULT_EPSILON`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a bound or `epsilon` is not
    /// finite, `epsilon` is not positive, `lower >= upper`, or excluding the
    /// bounds leaves an empty interval.
    pub fn with_bounds(
        lower: f64,
        upper: f64,
        include_lower: bool,
        include_upper: bool,
        epsilon: Option<f64>,
    ) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "bounds must be finite numbers, got [{lower}, {upper}]"
            )));
        }
        if lower >= upper {
            return Err(Error::InvalidConfiguration(format!(
                "lower bound {lower} must be below upper bound {upper}"
            )));
        }
        let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "epsilon must be a positive finite number, got {epsilon}"
            )));
        }

        let effective_lower = if include_lower {
            lower
        } else {
            (lower + epsilon).max(lower.next_up())
        };
        let effective_upper = if include_upper {
            upper
        } else {
            (upper - epsilon).min(upper.next_down())
        };
        if effective_lower > effective_upper {
            return Err(Error::InvalidConfiguration(format!(
                "excluding the bounds of [{lower}, {upper}] with epsilon {epsilon} leaves no values"
            )));
        }

        Ok(Self {
            lower,
            upper,
            include_lower,
            include_upper,
            epsilon,
            effective_lower,
            effective_upper,
        })
    }

    /// The declared lower bound.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// The declared upper bound.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Whether the lower bound belongs to the domain.
    #[must_use]
    pub fn include_lower(&self) -> bool {
        self.include_lower
    }

    /// Whether the upper bound belongs to the domain.
    #[must_use]
    pub fn include_upper(&self) -> bool {
        self.include_upper
    }

    /// The offset used for excluded bounds.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn normalize(&self, x: f64) -> f64 {
        (x - self.lower) / (self.upper - self.lower)
    }
}

impl ParamDef for MinMaxNumericParamDef {
    fn kind(&self) -> ParamKind {
        ParamKind::MinMaxNumeric
    }

    fn is_in_domain(&self, value: &ParamValue) -> bool {
        let Some(x) = value.as_f64() else {
            return false;
        };
        let above_lower = self.lower < x || (self.include_lower && self.lower <= x);
        let below_upper = x < self.upper || (self.include_upper && x <= self.upper);
        above_lower && below_upper
    }

    fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>> {
        let x = numeric_value(self, value)?;
        let warped = self.normalize(x);
        // Out-of-range values keep their position outside the unit interval.
        if (0.0..=1.0).contains(&warped) {
            let lo = self.normalize(self.effective_lower);
            let hi = self.normalize(self.effective_upper);
            Ok(vec![warped.clamp(lo, hi)])
        } else {
            Ok(vec![warped])
        }
    }

    fn warp_out(&self, coords: &[f64]) -> Result<ParamValue> {
        check_warp_len(1, coords)?;
        let x = self.lower + coords[0] * (self.upper - self.lower);
        Ok(ParamValue::Float(
            x.clamp(self.effective_lower, self.effective_upper),
        ))
    }

    fn warped_size(&self) -> usize {
        1
    }

    fn distance(&self, a: &ParamValue, b: &ParamValue) -> Result<f64> {
        numeric_distance(self, a, b)
    }

    fn compare_values(&self, a: &ParamValue, b: &ParamValue) -> Result<Option<Ordering>> {
        numeric_compare(self, a, b)
    }

    #[cfg(feature = "serde")]
    fn to_record(&self) -> Option<super::ParamRecord> {
        Some(super::ParamRecord::MinMaxNumericParamDef {
            lower_bound: self.lower,
            upper_bound: self.upper,
            include_lower: self.include_lower,
            include_upper: self.include_upper,
            epsilon: Some(self.epsilon),
        })
    }
}

/// A numeric parameter with one fixed and one asymptotic border.
///
/// The fixed `border` warps to `0` and the `asymptotic_border` to `1`. In
/// between, every tenfold reduction of the distance to the asymptotic border
/// halves the remaining distance to `1`: with
/// `d = |x - asymptotic_border| / |border - asymptotic_border|`, the warped
/// value is `1 - 2^log10(d)`. Values outside the interval (in either order of
/// the borders) are clamped before warping, and coordinates outside `[0, 1]`
/// are clamped before decoding.
///
/// A learning rate close to zero is described by `asymptotic_border = 0`,
/// `border = 1`; a decay rate close to one by `asymptotic_border = 1`,
/// `border = 0`.
///
/// # Example
///
/// ```
/// use hypersearch::ParamValue;
/// use hypersearch::parameter::{AsymptoticNumericParamDef, ParamDef};
///
/// let lr = AsymptoticNumericParamDef::new(0.0, 1.0).unwrap();
/// let w = lr.warp_in(&ParamValue::Float(0.1)).unwrap()[0];
/// assert!((w - 0.5).abs() < 1e-12);
/// let w = lr.warp_in(&ParamValue::Float(0.01)).unwrap()[0];
/// assert!((w - 0.75).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AsymptoticNumericParamDef {
    asymptotic_border: f64,
    border: f64,
}

impl AsymptoticNumericParamDef {
    /// Creates an asymptotic definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if either border is not finite
    /// or both borders coincide.
    #[allow(clippy::float_cmp)]
    pub fn new(asymptotic_border: f64, border: f64) -> Result<Self> {
        if !asymptotic_border.is_finite() || !border.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "borders must be finite numbers, got {asymptotic_border} and {border}"
            )));
        }
        if asymptotic_border == border {
            return Err(Error::InvalidConfiguration(format!(
                "asymptotic border and border must differ, both are {border}"
            )));
        }
        Ok(Self {
            asymptotic_border,
            border,
        })
    }

    /// The border approached asymptotically (warped to `1`).
    #[must_use]
    pub fn asymptotic_border(&self) -> f64 {
        self.asymptotic_border
    }

    /// The fixed border (warped to `0`).
    #[must_use]
    pub fn border(&self) -> f64 {
        self.border
    }

    fn min(&self) -> f64 {
        self.asymptotic_border.min(self.border)
    }

    fn max(&self) -> f64 {
        self.asymptotic_border.max(self.border)
    }
}

impl ParamDef for AsymptoticNumericParamDef {
    fn kind(&self) -> ParamKind {
        ParamKind::AsymptoticNumeric
    }

    fn is_in_domain(&self, value: &ParamValue) -> bool {
        value
            .as_f64()
            .is_some_and(|x| self.min() <= x && x <= self.max())
    }

    #[allow(clippy::float_cmp)]
    fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>> {
        let x = numeric_value(self, value)?.clamp(self.min(), self.max());
        if x == self.border {
            return Ok(vec![0.0]);
        }
        if x == self.asymptotic_border {
            return Ok(vec![1.0]);
        }
        let d = ((x - self.asymptotic_border) / (self.border - self.asymptotic_border)).abs();
        Ok(vec![1.0 - 2f64.powf(d.log10())])
    }

    fn warp_out(&self, coords: &[f64]) -> Result<ParamValue> {
        check_warp_len(1, coords)?;
        let w = coords[0].clamp(0.0, 1.0);
        if w >= 1.0 {
            return Ok(ParamValue::Float(self.asymptotic_border));
        }
        if w <= 0.0 {
            return Ok(ParamValue::Float(self.border));
        }
        let d = 10f64.powf((1.0 - w).log2());
        Ok(ParamValue::Float(
            self.asymptotic_border + d * (self.border - self.asymptotic_border),
        ))
    }

    fn warped_size(&self) -> usize {
        1
    }

    fn distance(&self, a: &ParamValue, b: &ParamValue) -> Result<f64> {
        numeric_distance(self, a, b)
    }

    fn compare_values(&self, a: &ParamValue, b: &ParamValue) -> Result<Option<Ordering>> {
        numeric_compare(self, a, b)
    }

    #[cfg(feature = "serde")]
    fn to_record(&self) -> Option<super::ParamRecord> {
        Some(super::ParamRecord::AsymptoticNumericParamDef {
            asymptotic_border: self.asymptotic_border,
            border: self.border,
        })
    }
}

fn checked_numeric(def: &dyn ParamDef, value: &ParamValue) -> Result<f64> {
    let x = numeric_value(def, value)?;
    if def.is_in_domain(value) {
        Ok(x)
    } else {
        Err(Error::invalid_value(
            def.kind(),
            format!("{value} is outside the parameter domain"),
        ))
    }
}

/// Signed difference of the warped coordinates, `warp(b) - warp(a)`.
pub(crate) fn numeric_distance(def: &dyn ParamDef, a: &ParamValue, b: &ParamValue) -> Result<f64> {
    checked_numeric(def, a)?;
    checked_numeric(def, b)?;
    Ok(def.warp_in(b)?[0] - def.warp_in(a)?[0])
}

pub(crate) fn numeric_compare(
    def: &dyn ParamDef,
    a: &ParamValue,
    b: &ParamValue,
) -> Result<Option<Ordering>> {
    let x = checked_numeric(def, a)?;
    let y = checked_numeric(def, b)?;
    Ok(x.partial_cmp(&y))
}
