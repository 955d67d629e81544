//! End-to-end runs on the synthetic wake farm

use yawopt::{OptimizerConfig, WindCondition, YawBounds, YawOptimizer};
use yawopt_testfarms::{GaussianWakeFarm, IsolatedTurbineFarm, alpha_ventus_description, row_layout};

fn optimizer(seed: u64) -> YawOptimizer {
    let config = OptimizerConfig::builder().bounds(0.0, 25.0).seed(seed).build();
    YawOptimizer::new(config).unwrap()
}

#[test]
fn test_row_of_three_steers_upstream_wake() {
    let layout = row_layout(3, 800.0).unwrap();
    let wind = WindCondition::new(270.0, 8.0).unwrap();
    let outcome = optimizer(42)
        .optimize_with_config_bounds(&GaussianWakeFarm::default(), &layout, &wind)
        .unwrap();

    let yaw = outcome.yaw.as_slice();
    assert_eq!(yaw.len(), 3);
    assert!(yaw[0] > 0.0, "upstream turbine not yawed: {:?}", yaw);
    assert!(yaw.iter().all(|&y| (0.0..=25.0).contains(&y)), "{:?}", yaw);
    assert!(outcome.optimized.total >= outcome.baseline.total);
    assert!(outcome.metadata.improved);
    assert!(outcome.gain().unwrap() > 0.0);
    assert_eq!(outcome.optimized.turbines.len(), 3);
}

#[test]
fn test_upstream_follows_wind_direction() {
    // easterly wind: the turbine at x = 1600 m leads the row
    let layout = row_layout(3, 800.0).unwrap();
    let wind = WindCondition::new(90.0, 8.0).unwrap();
    let outcome = optimizer(42)
        .optimize_with_config_bounds(&GaussianWakeFarm::default(), &layout, &wind)
        .unwrap();
    assert!(outcome.yaw[2] > 0.0, "{:?}", outcome.yaw);
    assert!(outcome.optimized.total >= outcome.baseline.total);
}

#[test]
fn test_single_turbine_has_nothing_to_gain() {
    let layout = row_layout(1, 800.0).unwrap();
    let wind = WindCondition::new(270.0, 8.0).unwrap();
    let outcome = optimizer(3)
        .optimize_with_config_bounds(&GaussianWakeFarm::default(), &layout, &wind)
        .unwrap();
    assert_eq!(outcome.yaw.as_slice(), &[0.0]);
    assert_eq!(outcome.optimized, outcome.baseline);
    assert_eq!(outcome.gain_percent, Some(0.0));
}

#[test]
fn test_isolated_turbines_keep_zero_yaw() {
    let layout = row_layout(4, 800.0).unwrap();
    let wind = WindCondition::new(0.0, 10.0).unwrap();
    let outcome = optimizer(8)
        .optimize_with_config_bounds(&IsolatedTurbineFarm::default(), &layout, &wind)
        .unwrap();
    assert!(outcome.yaw.is_zero());
    assert!(!outcome.metadata.improved);
}

#[test]
fn test_builtin_grid_never_loses_power() {
    let farm = alpha_ventus_description();
    let layout = farm.layout().unwrap();
    let wind = farm.wind().unwrap();
    let config =
        OptimizerConfig::builder().bounds(0.0, 25.0).seed(11).max_evaluations(3_000).build();
    let outcome = YawOptimizer::new(config)
        .unwrap()
        .optimize_with_config_bounds(&GaussianWakeFarm::default(), &layout, &wind)
        .unwrap();

    assert_eq!(outcome.yaw.len(), 12);
    let bounds = YawBounds::uniform(0.0, 25.0, 12).unwrap();
    assert!(bounds.contains(outcome.yaw.as_slice()));
    assert!(outcome.optimized.total >= outcome.baseline.total);
    assert!(outcome.gain().unwrap() >= 0.0);
    assert!(outcome.metadata.evaluations <= 3_000);
}
