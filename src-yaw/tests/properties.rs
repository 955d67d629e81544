//! Properties every optimization run must satisfy, whatever the model

use yawopt::{
    FlowFieldModel, Layout, OptimizationOutcome, OptimizerConfig, StrategyKind, WindCondition,
    YawBounds, YawOptimizer,
};
use yawopt_testfarms::{GaussianWakeFarm, SeparableConcaveFarm, grid_layout, row_layout};

fn westerly() -> WindCondition {
    WindCondition::new(270.0, 8.0).unwrap()
}

fn run(
    config: OptimizerConfig,
    model: &dyn FlowFieldModel,
    layout: &Layout,
    bounds: &YawBounds,
) -> OptimizationOutcome {
    YawOptimizer::new(config).unwrap().optimize(model, layout, &westerly(), bounds).unwrap()
}

#[test]
fn test_fixed_bounds_return_the_constant_vector() {
    let layout = row_layout(3, 800.0).unwrap();
    let model = GaussianWakeFarm::default();
    for value in [0.0, 10.0, -7.5] {
        let config = OptimizerConfig::builder().bounds(value, value).seed(1).build();
        let outcome = YawOptimizer::new(config)
            .unwrap()
            .optimize_with_config_bounds(&model, &layout, &westerly())
            .unwrap();
        assert_eq!(outcome.yaw.as_slice(), &[value; 3]);
        assert!(outcome.metadata.evaluations <= 3, "{}", outcome.metadata.evaluations);
    }
}

#[test]
fn test_results_stay_within_bounds() {
    let layout = row_layout(3, 800.0).unwrap();
    let model = GaussianWakeFarm::default();
    let cases = [
        YawBounds::uniform(0.0, 25.0, 3).unwrap(),
        YawBounds::uniform(-25.0, 25.0, 3).unwrap(),
        YawBounds::uniform(-10.0, 0.0, 3).unwrap(),
        YawBounds::per_turbine(&[(5.0, 15.0), (-3.0, 3.0), (0.0, 0.0)]).unwrap(),
    ];
    for (seed, bounds) in cases.iter().enumerate() {
        let config = OptimizerConfig::builder().seed(seed as u64).max_evaluations(1_500).build();
        let outcome = run(config, &model, &layout, bounds);
        assert!(
            bounds.contains(outcome.yaw.as_slice()),
            "{:?} outside {:?}",
            outcome.yaw,
            bounds.pairs()
        );
    }
}

#[test]
fn test_never_below_baseline() {
    let model = GaussianWakeFarm::default();
    for (layout, strategy) in [
        (row_layout(2, 500.0).unwrap(), StrategyKind::DifferentialEvolution),
        (row_layout(4, 700.0).unwrap(), StrategyKind::PatternSearch),
        (grid_layout(2, 2, 800.0).unwrap(), StrategyKind::DifferentialEvolution),
    ] {
        let config = OptimizerConfig::builder()
            .bounds(0.0, 25.0)
            .strategy(strategy)
            .seed(21)
            .max_evaluations(1_000)
            .build();
        let outcome = YawOptimizer::new(config)
            .unwrap()
            .optimize_with_config_bounds(&model, &layout, &westerly())
            .unwrap();
        assert!(outcome.optimized.total >= outcome.baseline.total);
        assert_eq!(outcome.metadata.improved, outcome.optimized.total > outcome.baseline.total);
    }
}

#[test]
fn test_same_seed_same_outcome() {
    let layout = row_layout(3, 800.0).unwrap();
    let model = GaussianWakeFarm::default();
    for strategy in [StrategyKind::DifferentialEvolution, StrategyKind::PatternSearch] {
        let config = OptimizerConfig::builder()
            .bounds(0.0, 25.0)
            .strategy(strategy)
            .seed(1234)
            .parallel(true)
            .build();
        let optimizer = YawOptimizer::new(config).unwrap();
        let first = optimizer.optimize_with_config_bounds(&model, &layout, &westerly()).unwrap();
        let second = optimizer.optimize_with_config_bounds(&model, &layout, &westerly()).unwrap();
        assert_eq!(first, second, "{} is not reproducible", strategy);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let layout = row_layout(3, 800.0).unwrap();
    let model = GaussianWakeFarm::default();
    let outcome = |parallel: bool| {
        let config = OptimizerConfig::builder().bounds(0.0, 25.0).seed(77).parallel(parallel).build();
        YawOptimizer::new(config)
            .unwrap()
            .optimize_with_config_bounds(&model, &layout, &westerly())
            .unwrap()
    };
    assert_eq!(outcome(true), outcome(false));
}

#[test]
fn test_concave_farm_converges_to_known_maximum() {
    let layout = row_layout(4, 800.0).unwrap();
    let model = SeparableConcaveFarm::new(vec![3.0, 12.0, 21.0, 30.0]);
    let bounds = YawBounds::uniform(0.0, 25.0, 4).unwrap();
    let expected = model.optimum(&bounds);
    let max_total = model.max_total(&bounds);

    for strategy in [StrategyKind::DifferentialEvolution, StrategyKind::PatternSearch] {
        let config = OptimizerConfig::builder().strategy(strategy).seed(5).build();
        let outcome = run(config, &model, &layout, &bounds);
        for (y, e) in outcome.yaw.as_slice().iter().zip(&expected) {
            assert!((y - e).abs() < 0.05, "{}: yaw {:?} vs {:?}", strategy, outcome.yaw, expected);
        }
        assert!(
            (outcome.optimized.total - max_total).abs() / max_total < 1e-6,
            "{}: {} vs {}",
            strategy,
            outcome.optimized.total,
            max_total
        );
    }
}
