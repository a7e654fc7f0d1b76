use std::cmp::Ordering;

use hypersearch::parameter::{
    EquidistantPositionParamDef, FixedValueParamDef, ParamDef, ParamKind, PositionParamDef,
    RangeParamDef,
};
use hypersearch::{Error, ParamValue};

#[test]
fn test_position_length_mismatch() {
    assert!(matches!(
        PositionParamDef::new(["a", "b", "c"], [0.0, 1.0]),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_position_decoding_clamps_outside_unit_interval() {
    let def = PositionParamDef::new(["first", "second", "third"], [10.0, 20.0, 30.0]).unwrap();
    assert_eq!(def.warp_out(&[-5.0]).unwrap(), ParamValue::from("first"));
    assert_eq!(def.warp_out(&[5.0]).unwrap(), ParamValue::from("third"));
    assert_eq!(def.warp_out(&[0.45]).unwrap(), ParamValue::from("second"));
}

#[test]
fn test_position_distance_is_not_normalized() {
    let def = PositionParamDef::new(["a", "b"], [10.0, 30.0]).unwrap();
    let d = def.distance(&"b".into(), &"a".into()).unwrap();
    assert!((d - 20.0).abs() < 1e-12);
}

#[test]
fn test_unsorted_positions() {
    let def = PositionParamDef::new(["mid", "low", "high"], [5.0, 0.0, 10.0]).unwrap();
    assert_eq!(def.warp_in(&"mid".into()).unwrap(), vec![0.5]);
    assert_eq!(def.warp_out(&[0.1]).unwrap(), ParamValue::from("low"));
    // Ordering follows the list, not the positions.
    assert_eq!(
        def.compare_values(&"mid".into(), &"low".into()).unwrap(),
        Some(Ordering::Less)
    );
}

#[test]
fn test_fixed_values() {
    let def = FixedValueParamDef::new([1, 2, 4, 8, 16]).unwrap();
    assert_eq!(def.kind(), ParamKind::FixedValue);
    assert_eq!(def.warp_in(&ParamValue::Int(16)).unwrap(), vec![1.0]);
    assert_eq!(def.warp_out(&[0.2]).unwrap(), ParamValue::Int(4));
    assert!(!def.is_in_domain(&ParamValue::Int(3)));
}

#[test]
fn test_equidistant() {
    let def = EquidistantPositionParamDef::new(["a", "b", "c", "d", "e"]).unwrap();
    assert_eq!(def.warp_in(&"d".into()).unwrap(), vec![0.75]);
    assert_eq!(def.warp_out(&[0.3]).unwrap(), ParamValue::from("b"));
    assert!(def.kind().satisfies(ParamKind::Position));
}

#[test]
fn test_range_matches_stepped_sequence() {
    let def = RangeParamDef::new(3, 12, 4).unwrap();
    assert_eq!(
        def.values(),
        &[ParamValue::Int(3), ParamValue::Int(7), ParamValue::Int(11)]
    );
    assert_eq!(def.start(), 3.0);
    assert_eq!(def.stop(), 12.0);
    assert_eq!(def.step(), 4.0);
    assert_eq!(def.warp_in(&ParamValue::Int(7)).unwrap(), vec![0.5]);
}

#[test]
fn test_range_float_values() {
    let def = RangeParamDef::float(0.5, 2.0, 0.5).unwrap();
    assert_eq!(
        def.values(),
        &[ParamValue::Float(0.5), ParamValue::Float(1.0), ParamValue::Float(1.5)]
    );
    // Whole numbers match the float entries.
    assert!(def.is_in_domain(&ParamValue::Int(1)));
    assert!(!def.is_in_domain(&ParamValue::Int(2)));
}

#[test]
fn test_range_membership_is_numeric() {
    let def = RangeParamDef::up_to(5).unwrap();
    assert!(def.is_in_domain(&ParamValue::Int(3)));
    assert!(def.is_in_domain(&ParamValue::Float(3.0)));
    assert!(!def.is_in_domain(&ParamValue::Float(3.5)));
    assert!(!def.is_in_domain(&ParamValue::from("3")));
    assert_eq!(def.warp_in(&ParamValue::Float(3.0)).unwrap(), vec![0.75]);
    assert_eq!(def.warp_out(&[0.75]).unwrap(), ParamValue::Int(3));
    assert_eq!(
        def.distance(&ParamValue::Float(1.0), &ParamValue::Int(4)).unwrap(),
        3.0
    );
    assert_eq!(
        def.compare_values(&ParamValue::Float(4.0), &ParamValue::Int(1)).unwrap(),
        Some(Ordering::Greater)
    );
}

#[test]
fn test_shared_positions_rejected() {
    for positions in [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [2.0, 5.0, 2.0]] {
        assert!(matches!(
            PositionParamDef::new(["a", "b", "c"], positions),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn test_fixed_values_colliding_numerically_rejected() {
    assert!(matches!(
        FixedValueParamDef::new([ParamValue::Int(1), ParamValue::Float(1.0), ParamValue::Int(2)]),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        FixedValueParamDef::new([4, 8, 4]),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_fixed_values_round_trip_every_value() {
    let def = FixedValueParamDef::new([
        ParamValue::Int(1),
        ParamValue::Float(1.5),
        ParamValue::Int(2),
        ParamValue::Float(-3.25),
    ])
    .unwrap();
    for v in def.values() {
        assert_eq!(&def.warp_out(&def.warp_in(v).unwrap()).unwrap(), v);
    }
}

#[test]
fn test_nan_coordinate_is_rejected() {
    let def = EquidistantPositionParamDef::new(["a", "b", "c"]).unwrap();
    assert!(matches!(
        def.warp_out(&[f64::NAN]),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn test_range_empty_is_invalid() {
    assert!(matches!(
        RangeParamDef::new(5, 3, 1),
        Err(Error::InvalidConfiguration(_))
    ));
}
