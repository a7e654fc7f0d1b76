use std::cmp::Ordering;

use hypersearch::parameter::{
    AsymptoticNumericParamDef, DEFAULT_EPSILON, MinMaxNumericParamDef, NumericParamDef, ParamDef,
    ParamKind,
};
use hypersearch::{Error, ParamValue};

fn float(v: f64) -> ParamValue {
    ParamValue::Float(v)
}

fn out(def: &dyn ParamDef, c: f64) -> f64 {
    def.warp_out(&[c]).unwrap().as_f64().unwrap()
}

#[test]
fn test_excluded_upper_bound() {
    let def = MinMaxNumericParamDef::with_bounds(0.0, 10.0, true, false, None).unwrap();
    let w = def.warp_in(&float(10.0)).unwrap()[0];
    assert!(w < 1.0);
    assert!(out(&def, 1.0) < 10.0);
    assert!(!def.is_in_domain(&float(10.0)));
    assert!(def.is_in_domain(&float(0.0)));
    assert!(def.is_in_domain(&float(9.999)));
}

#[test]
fn test_default_epsilon() {
    let def = MinMaxNumericParamDef::with_bounds(0.0, 1.0, false, false, None).unwrap();
    assert_eq!(def.epsilon(), DEFAULT_EPSILON);
    assert!(out(&def, 0.0) > 0.0);
    assert!(out(&def, 1.0) < 1.0);
}

#[test]
fn test_integer_values_accepted() {
    let def = MinMaxNumericParamDef::new(0.0, 8.0).unwrap();
    assert_eq!(def.warp_in(&ParamValue::Int(2)).unwrap(), vec![0.25]);
    assert!(matches!(
        def.warp_in(&ParamValue::from("two")),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn test_malformed_bounds() {
    assert!(MinMaxNumericParamDef::new(1.0, 1.0).is_err());
    assert!(MinMaxNumericParamDef::new(f64::NAN, 1.0).is_err());
    assert!(MinMaxNumericParamDef::new(0.0, f64::INFINITY).is_err());
}

#[test]
fn test_numeric_compare_and_distance() {
    let def = MinMaxNumericParamDef::new(0.0, 10.0).unwrap();
    assert_eq!(
        def.compare_values(&float(2.0), &float(7.0)).unwrap(),
        Some(Ordering::Less)
    );
    let d = def.distance(&float(2.0), &float(7.0)).unwrap();
    assert!((d - 0.5).abs() < 1e-12);
    assert!(def.compare_values(&float(2.0), &float(11.0)).is_err());
}

#[test]
fn test_custom_warping() {
    // Log scale between 1 and 1000.
    let def = NumericParamDef::new(|x: f64| x.log10() / 3.0, |w: f64| 10f64.powf(w * 3.0));
    assert_eq!(def.kind(), ParamKind::Numeric);
    let w = def.warp_in(&float(10.0)).unwrap()[0];
    assert!((w - 1.0 / 3.0).abs() < 1e-12);
    assert!((out(&def, 2.0 / 3.0) - 100.0).abs() < 1e-9);
    assert!(!def.is_in_domain(&float(0.5)));
}

#[test]
fn test_asymptotic_decades_halve_the_remaining_distance() {
    let def = AsymptoticNumericParamDef::new(0.0, 1.0).unwrap();
    let expected = [(1.0, 0.0), (0.1, 0.5), (0.01, 0.75), (0.001, 0.875), (0.0, 1.0)];
    for (x, w) in expected {
        let got = def.warp_in(&float(x)).unwrap()[0];
        assert!((got - w).abs() < 1e-9, "warp_in({x}) = {got}, expected {w}");
    }
}

#[test]
fn test_asymptotic_clamps_out_of_range() {
    let def = AsymptoticNumericParamDef::new(1.0, 0.0).unwrap();
    assert_eq!(def.warp_in(&float(-3.0)).unwrap(), vec![0.0]);
    assert_eq!(def.warp_in(&float(4.0)).unwrap(), vec![1.0]);
    assert!(!def.is_in_domain(&float(1.5)));
    assert_eq!(out(&def, 2.0), 1.0);
}

#[test]
fn test_asymptotic_identical_borders_rejected() {
    assert!(matches!(
        AsymptoticNumericParamDef::new(2.0, 2.0),
        Err(Error::InvalidConfiguration(_))
    ));
}
