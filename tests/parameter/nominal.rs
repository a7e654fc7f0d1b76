use std::cmp::Ordering;

use hypersearch::parameter::{NominalParamDef, OrdinalParamDef, ParamDef, ParamKind};
use hypersearch::{Error, ParamValue};

#[test]
fn test_mixed_value_types() {
    let def = NominalParamDef::new([
        ParamValue::Bool(true),
        ParamValue::Int(3),
        ParamValue::from("three"),
    ])
    .unwrap();
    assert_eq!(def.warped_size(), 3);
    assert!(def.is_in_domain(&ParamValue::Int(3)));
    assert!(def.is_in_domain(&ParamValue::Float(3.0)));
    assert!(!def.is_in_domain(&ParamValue::Int(1)));
    assert_eq!(def.warp_in(&ParamValue::Float(3.0)).unwrap(), vec![0.0, 1.0, 0.0]);
    assert_eq!(def.warp_in(&ParamValue::from("three")).unwrap(), vec![0.0, 0.0, 1.0]);
}

#[test]
fn test_duplicates_rejected() {
    assert!(matches!(
        NominalParamDef::new(["a", "b", "a"]),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_numerically_equal_values_are_duplicates() {
    assert!(matches!(
        NominalParamDef::new([ParamValue::Int(2), ParamValue::Float(2.0)]),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_nan_coordinate_is_rejected() {
    let def = OrdinalParamDef::new(["s", "m", "l"]).unwrap();
    assert!(matches!(
        def.warp_out(&[0.1, f64::NAN, 0.3]),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn test_ordinal_is_a_nominal() {
    let def = OrdinalParamDef::new(["xs", "s", "m", "l", "xl"]).unwrap();
    assert_eq!(def.kind(), ParamKind::Ordinal);
    assert!(def.kind().satisfies(ParamKind::Nominal));
    assert_eq!(def.warped_size(), 5);
}

#[test]
fn test_ordinal_decode_picks_strongest_coordinate() {
    let def = OrdinalParamDef::new(["low", "mid", "high"]).unwrap();
    assert_eq!(def.warp_out(&[0.2, 0.1, 0.9]).unwrap(), ParamValue::from("high"));
    assert_eq!(def.warp_out(&[0.0, 0.0, 0.0]).unwrap(), ParamValue::from("low"));
}

#[test]
fn test_ordinal_ordering() {
    let def = OrdinalParamDef::new(["low", "mid", "high"]).unwrap();
    assert_eq!(
        def.compare_values(&"high".into(), &"low".into()).unwrap(),
        Some(Ordering::Greater)
    );
    assert!((def.distance(&"low".into(), &"low".into()).unwrap()).abs() < f64::EPSILON);
}

#[test]
fn test_nominal_is_unordered() {
    let def = NominalParamDef::new(["x", "y"]).unwrap();
    assert_eq!(def.compare_values(&"x".into(), &"y".into()).unwrap(), None);
}
