use hypersearch::optimizer::{DEFAULT_FAILED_VALUE, check_experiment_supported, is_supported_param_type};
use hypersearch::parameter::{
    AsymptoticNumericParamDef, FixedValueParamDef, MinMaxNumericParamDef, NominalParamDef,
    OrdinalParamDef, ParamDef, ParamKind, RangeParamDef,
};
use hypersearch::{
    Candidate, Direction, Error, Experiment, FailedTreatment, Optimizer, OptimizerConfig,
    ParamValue, RandomSearch, Result,
};

fn numeric_experiment(direction: Direction) -> Experiment {
    Experiment::builder("numeric")
        .param("x", MinMaxNumericParamDef::new(0.0, 1.0).unwrap())
        .direction(direction)
        .build()
        .unwrap()
}

fn at(x: f64) -> Candidate {
    Candidate::new([("x", ParamValue::Float(x))])
}

fn effective(treatment: FailedTreatment, exp: &Experiment) -> Vec<f64> {
    treatment
        .effective_results(exp)
        .into_iter()
        .map(|(_, r)| r)
        .collect()
}

/// Only accepts numeric definitions, like a Gaussian-process model would.
struct NumericOnly {
    experiment: Experiment,
}

impl Optimizer for NumericOnly {
    fn name(&self) -> &str {
        "NumericOnly"
    }

    fn supported_param_types(&self) -> &[ParamKind] {
        &[ParamKind::Numeric]
    }

    fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    fn update(&mut self, experiment: Experiment) -> Result<()> {
        check_experiment_supported(self.name(), &experiment, self.supported_param_types())?;
        self.experiment = experiment;
        Ok(())
    }

    fn get_next_candidates(&mut self, _n: usize) -> Vec<Candidate> {
        Vec::new()
    }
}

#[test]
fn test_ignore_drops_failed() {
    let mut exp = numeric_experiment(Direction::Minimize);
    exp.add_finished(at(0.1).with_result(1.0)).unwrap();
    exp.add_finished(at(0.2).failed()).unwrap();
    exp.add_finished(at(0.3).with_result(2.0).failed()).unwrap();
    assert_eq!(effective(FailedTreatment::Ignore, &exp), vec![1.0]);
}

#[test]
fn test_fixed_value_default_follows_direction() {
    for (direction, expected) in [
        (Direction::Minimize, DEFAULT_FAILED_VALUE),
        (Direction::Maximize, -DEFAULT_FAILED_VALUE),
    ] {
        let mut exp = numeric_experiment(direction);
        exp.add_finished(at(0.1).with_result(1.0)).unwrap();
        exp.add_finished(at(0.2).failed()).unwrap();
        assert_eq!(
            effective(FailedTreatment::FixedValue(None), &exp),
            vec![1.0, expected]
        );
        assert_eq!(
            effective(FailedTreatment::FixedValue(Some(42.0)), &exp),
            vec![1.0, 42.0]
        );
    }
}

#[test]
fn test_worst_mult_maximization() {
    let mut exp = numeric_experiment(Direction::Maximize);
    exp.add_finished(at(0.1).with_result(10.0)).unwrap();
    exp.add_finished(at(0.2).with_result(4.0)).unwrap();
    exp.add_finished(at(0.3).failed()).unwrap();
    // worst 4, best 10: 4 + 0.5 * (4 - 10)
    assert_eq!(
        effective(FailedTreatment::WorstMult(0.5), &exp),
        vec![10.0, 4.0, 1.0]
    );
}

#[test]
fn test_worst_mult_without_valid_results() {
    let mut exp = numeric_experiment(Direction::Minimize);
    exp.add_finished(at(0.1).failed()).unwrap();
    exp.add_finished(at(0.2).with_result(f64::NAN)).unwrap();
    assert!(effective(FailedTreatment::default(), &exp).is_empty());
}

#[test]
fn test_worst_mult_skips_infinite_results() {
    let mut exp = numeric_experiment(Direction::Minimize);
    exp.add_finished(at(0.1).with_result(1.0)).unwrap();
    exp.add_finished(at(0.2).with_result(3.0)).unwrap();
    exp.add_finished(at(0.3).with_result(f64::INFINITY)).unwrap();
    exp.add_finished(at(0.4).failed()).unwrap();
    // worst finite 3, best 1: 3 + 2 * (3 - 1)
    assert_eq!(
        effective(FailedTreatment::WorstMult(2.0), &exp),
        vec![1.0, 3.0, f64::INFINITY, 7.0]
    );
}

#[test]
fn test_worst_mult_never_substitutes_non_finite() {
    let mut exp = numeric_experiment(Direction::Minimize);
    exp.add_finished(at(0.1).with_result(f64::NEG_INFINITY)).unwrap();
    exp.add_finished(at(0.2).failed()).unwrap();
    assert_eq!(
        effective(FailedTreatment::WorstMult(2.0), &exp),
        vec![f64::NEG_INFINITY]
    );

    let mut exp = numeric_experiment(Direction::Minimize);
    exp.add_finished(at(0.1).with_result(-f64::MAX)).unwrap();
    exp.add_finished(at(0.2).with_result(f64::MAX)).unwrap();
    exp.add_finished(at(0.3).failed()).unwrap();
    let results = effective(FailedTreatment::WorstMult(2.0), &exp);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_finite()));
}

#[test]
fn test_nan_results_count_as_failed() {
    let mut exp = numeric_experiment(Direction::Minimize);
    exp.add_finished(at(0.1).with_result(2.0)).unwrap();
    exp.add_finished(at(0.2).with_result(f64::NAN)).unwrap();
    assert_eq!(
        effective(FailedTreatment::FixedValue(Some(9.0)), &exp),
        vec![2.0, 9.0]
    );
}

#[test]
fn test_support_follows_the_kind_lattice() {
    let defs: Vec<(Box<dyn ParamDef>, bool)> = vec![
        (Box::new(MinMaxNumericParamDef::new(0.0, 1.0).unwrap()), true),
        (Box::new(AsymptoticNumericParamDef::new(0.0, 1.0).unwrap()), true),
        (Box::new(NominalParamDef::new(["a"]).unwrap()), false),
        (Box::new(OrdinalParamDef::new(["a"]).unwrap()), false),
        (Box::new(FixedValueParamDef::new([1, 2]).unwrap()), false),
    ];
    for (def, numeric) in &defs {
        assert_eq!(
            is_supported_param_type(def.as_ref(), &[ParamKind::Numeric]),
            *numeric,
            "{:?}",
            def.kind()
        );
        assert_eq!(
            is_supported_param_type(def.as_ref(), &[ParamKind::Nominal]),
            !*numeric,
            "{:?}",
            def.kind()
        );
    }
    let range = RangeParamDef::new(0, 3, 1).unwrap();
    assert!(is_supported_param_type(&range, &[ParamKind::Ordinal]));
    assert!(!is_supported_param_type(&range, &[ParamKind::EquidistantPosition]));
}

#[test]
fn test_update_rejects_unsupported_snapshot() {
    let mut opt = NumericOnly {
        experiment: numeric_experiment(Direction::Minimize),
    };
    let mixed = Experiment::builder("mixed")
        .param("x", MinMaxNumericParamDef::new(0.0, 1.0).unwrap())
        .param("act", NominalParamDef::new(["relu", "tanh"]).unwrap())
        .build()
        .unwrap();
    let err = opt.update(mixed).unwrap_err();
    match err {
        Error::UnsupportedParameterType {
            optimizer,
            param,
            kind,
        } => {
            assert_eq!(optimizer, "NumericOnly");
            assert_eq!(param, "act");
            assert_eq!(kind, ParamKind::Nominal);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(opt.experiment().name(), "numeric");
}

#[test]
fn test_random_search_covers_the_domain() {
    let exp = Experiment::builder("cover")
        .param("x", MinMaxNumericParamDef::new(-1.0, 1.0).unwrap())
        .param("c", NominalParamDef::new(["a", "b", "c"]).unwrap())
        .build()
        .unwrap();
    let mut opt = RandomSearch::new(exp.clone(), &OptimizerConfig::default().seed(3)).unwrap();
    let proposals = opt.get_next_candidates(300);
    assert_eq!(proposals.len(), 300);

    let mut seen = std::collections::HashSet::new();
    let (mut below, mut above) = (0, 0);
    for c in &proposals {
        exp.check_candidate(c).unwrap();
        seen.insert(c.get("c").and_then(ParamValue::as_str).unwrap().to_owned());
        if c.get("x").and_then(ParamValue::as_f64).unwrap() < 0.0 {
            below += 1;
        } else {
            above += 1;
        }
    }
    assert_eq!(seen.len(), 3);
    assert!(below > 50 && above > 50);
}

#[test]
fn test_random_search_proposals_are_fresh() {
    let mut opt = RandomSearch::new(
        numeric_experiment(Direction::Minimize),
        &OptimizerConfig::default(),
    )
    .unwrap();
    let a = opt.get_next_candidates(2);
    assert_eq!(a.len(), 2);
    assert_ne!(a[0].id(), a[1].id());
    assert!(a.iter().all(|c| c.result.is_none() && !c.failed));
    assert!(opt.get_next_candidates(0).is_empty());
}

#[test]
fn test_random_search_rejects_bad_config() {
    let exp = numeric_experiment(Direction::Minimize);
    for config in [
        OptimizerConfig::default().min_candidates(0),
        OptimizerConfig::default().treat_failed(FailedTreatment::WorstMult(f64::INFINITY)),
        OptimizerConfig::default().treat_failed(FailedTreatment::FixedValue(Some(f64::NAN))),
    ] {
        assert!(matches!(
            RandomSearch::new(exp.clone(), &config),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn test_random_search_update_replaces_snapshot() {
    let mut exp = numeric_experiment(Direction::Minimize);
    let mut opt = RandomSearch::new(exp.clone(), &OptimizerConfig::default().seed(5)).unwrap();
    exp.add_finished(at(0.5).with_result(1.0)).unwrap();
    opt.update(exp).unwrap();
    assert_eq!(opt.experiment().candidates_finished().len(), 1);
    opt.exit();
    opt.exit();
}
