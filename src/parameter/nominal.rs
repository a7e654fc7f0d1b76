use core::cmp::Ordering;

use super::{
    ParamDef, ParamKind, check_value_list, check_warp_len, contains_value, first_argmax, index_in,
};
use crate::error::Result;
use crate::param::ParamValue;

/// An unordered finite set of values, warped as a one-hot vector.
///
/// Decoding picks the value whose coordinate is largest; ties go to the
/// first maximum.
///
/// # Example
///
/// ```
/// use hypersearch::ParamValue;
/// use hypersearch::parameter::{NominalParamDef, ParamDef};
///
/// let optimizer = NominalParamDef::new(["sgd", "adam", "rmsprop"]).unwrap();
/// assert_eq!(optimizer.warp_in(&"adam".into()).unwrap(), vec![0.0, 1.0, 0.0]);
/// assert_eq!(
///     optimizer.warp_out(&[0.1, 0.3, 0.7]).unwrap(),
///     ParamValue::from("rmsprop")
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NominalParamDef {
    values: Vec<ParamValue>,
}

impl NominalParamDef {
    /// Creates a nominal definition over `values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `values` is empty or holds
    /// duplicates.
    pub fn new<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        check_value_list(&values)?;
        Ok(Self { values })
    }

    /// The possible values, in declaration order.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    fn one_hot(&self, index: usize) -> Vec<f64> {
        let mut warped = vec![0.0; self.values.len()];
        warped[index] = 1.0;
        warped
    }
}

impl ParamDef for NominalParamDef {
    fn kind(&self) -> ParamKind {
        ParamKind::Nominal
    }

    fn is_in_domain(&self, value: &ParamValue) -> bool {
        contains_value(&self.values, value)
    }

    fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>> {
        let index = index_in(self, &self.values, value)?;
        Ok(self.one_hot(index))
    }

    fn warp_out(&self, coords: &[f64]) -> Result<ParamValue> {
        check_warp_len(self.values.len(), coords)?;
        Ok(self.values[first_argmax(self, coords)?].clone())
    }

    fn warped_size(&self) -> usize {
        self.values.len()
    }

    #[cfg(feature = "serde")]
    fn to_record(&self) -> Option<super::ParamRecord> {
        Some(super::ParamRecord::NominalParamDef {
            values: self.values.clone(),
        })
    }
}

/// A finite set of values ordered by their position in the list.
///
/// Warping is the same one-hot encoding as [`NominalParamDef`]; the order
/// only affects [`compare_values`](ParamDef::compare_values) and the
/// distance, which is the rank difference normalized by the number of values.
#[derive(Clone, Debug, PartialEq)]
pub struct OrdinalParamDef {
    nominal: NominalParamDef,
}

impl OrdinalParamDef {
    /// Creates an ordinal definition; the list order is the rank order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `values` is empty or holds
    /// duplicates.
    pub fn new<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Ok(Self {
            nominal: NominalParamDef::new(values)?,
        })
    }

    /// The possible values, lowest rank first.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        self.nominal.values()
    }
}

impl ParamDef for OrdinalParamDef {
    fn kind(&self) -> ParamKind {
        ParamKind::Ordinal
    }

    fn is_in_domain(&self, value: &ParamValue) -> bool {
        self.nominal.is_in_domain(value)
    }

    fn warp_in(&self, value: &ParamValue) -> Result<Vec<f64>> {
        let index = index_in(self, self.values(), value)?;
        Ok(self.nominal.one_hot(index))
    }

    fn warp_out(&self, coords: &[f64]) -> Result<ParamValue> {
        self.nominal.warp_out(coords)
    }

    fn warped_size(&self) -> usize {
        self.nominal.warped_size()
    }

    #[allow(clippy::cast_precision_loss)]
    fn distance(&self, a: &ParamValue, b: &ParamValue) -> Result<f64> {
        let ia = index_in(self, self.values(), a)?;
        let ib = index_in(self, self.values(), b)?;
        Ok(ia.abs_diff(ib) as f64 / self.values().len() as f64)
    }

    fn compare_values(&self, a: &ParamValue, b: &ParamValue) -> Result<Option<Ordering>> {
        compare_by_index(self, self.values(), a, b)
    }

    #[cfg(feature = "serde")]
    fn to_record(&self) -> Option<super::ParamRecord> {
        Some(super::ParamRecord::OrdinalParamDef {
            values: self.values().to_vec(),
        })
    }
}

/// Rank comparison shared by every ordered set-based definition.
pub(crate) fn compare_by_index(
    def: &dyn ParamDef,
    values: &[ParamValue],
    a: &ParamValue,
    b: &ParamValue,
) -> Result<Option<Ordering>> {
    let ia = index_in(def, values, a)?;
    let ib = index_in(def, values, b)?;
    Ok(Some(ia.cmp(&ib)))
}
