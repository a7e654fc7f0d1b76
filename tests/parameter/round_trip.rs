use hypersearch::ParamValue;
use hypersearch::parameter::{
    AsymptoticNumericParamDef, EquidistantPositionParamDef, FixedValueParamDef,
    MinMaxNumericParamDef, NominalParamDef, OrdinalParamDef, ParamDef, PositionParamDef,
    RangeParamDef,
};

/// Every set-based definition paired with the values it declares.
fn discrete_defs() -> Vec<(Box<dyn ParamDef>, Vec<ParamValue>)> {
    let labels: Vec<ParamValue> = ["relu", "tanh", "sigmoid"].map(ParamValue::from).to_vec();
    let sizes: Vec<ParamValue> = [8, 16, 32, 64].map(ParamValue::from).to_vec();
    vec![
        (
            Box::new(NominalParamDef::new(labels.clone()).unwrap()),
            labels.clone(),
        ),
        (
            Box::new(OrdinalParamDef::new(labels.clone()).unwrap()),
            labels.clone(),
        ),
        (
            Box::new(PositionParamDef::new(labels.clone(), [0.0, 0.3, 1.0]).unwrap()),
            labels.clone(),
        ),
        (
            Box::new(EquidistantPositionParamDef::new(labels.clone()).unwrap()),
            labels,
        ),
        (
            Box::new(FixedValueParamDef::new(sizes.clone()).unwrap()),
            sizes,
        ),
        (
            Box::new(RangeParamDef::up_to(7).unwrap()),
            (0..7).map(ParamValue::from).collect(),
        ),
    ]
}

#[test]
fn test_discrete_round_trip() {
    for (def, values) in discrete_defs() {
        for v in &values {
            assert!(def.is_in_domain(v), "{:?} should accept {v}", def.kind());
            let coords = def.warp_in(v).unwrap();
            assert_eq!(coords.len(), def.warped_size());
            assert!(coords.iter().all(|c| (0.0..=1.0).contains(c)));
            assert_eq!(&def.warp_out(&coords).unwrap(), v, "{:?}", def.kind());
        }
    }
}

#[test]
fn test_decoded_values_are_in_domain() {
    for (def, _) in discrete_defs() {
        let k = def.warped_size();
        for step in 0..=20 {
            let c = f64::from(step) / 20.0;
            let value = def.warp_out(&vec![c; k]).unwrap();
            assert!(def.is_in_domain(&value), "{:?} decoded {value}", def.kind());
        }
    }
}

#[test]
fn test_wrong_coordinate_count() {
    for (def, _) in discrete_defs() {
        let too_long = vec![0.5; def.warped_size() + 1];
        assert!(def.warp_out(&too_long).is_err());
    }
}

#[test]
fn test_numeric_round_trip() {
    let defs: Vec<Box<dyn ParamDef>> = vec![
        Box::new(MinMaxNumericParamDef::new(-5.0, 5.0).unwrap()),
        Box::new(MinMaxNumericParamDef::with_bounds(-5.0, 5.0, false, false, Some(1e-6)).unwrap()),
        Box::new(AsymptoticNumericParamDef::new(0.0, 10.0).unwrap()),
    ];
    for def in &defs {
        for x in [-4.5, -1.0, 0.25, 3.0, 4.999] {
            let value = ParamValue::Float(x);
            if !def.is_in_domain(&value) {
                continue;
            }
            let coords = def.warp_in(&value).unwrap();
            let back = def.warp_out(&coords).unwrap().as_f64().unwrap();
            assert!(
                (back - x).abs() < 1e-9,
                "{:?}: {x} came back as {back}",
                def.kind()
            );
        }
    }
}

#[test]
fn test_numeric_decoding_stays_in_domain() {
    let defs: Vec<Box<dyn ParamDef>> = vec![
        Box::new(MinMaxNumericParamDef::with_bounds(0.0, 1.0, false, false, None).unwrap()),
        Box::new(AsymptoticNumericParamDef::new(1.0, 0.0).unwrap()),
    ];
    for def in &defs {
        for c in [0.0, 0.001, 0.5, 0.999, 1.0] {
            let value = def.warp_out(&[c]).unwrap();
            assert!(def.is_in_domain(&value), "{:?} decoded {value}", def.kind());
        }
    }
}
