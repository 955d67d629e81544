use ndarray::Array1;
use yawopt_de::{differential_evolution, DEConfigBuilder, PatternSearchConfig, Strategy};

fn rastrigin(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    10.0 * n
        + x.iter()
            .map(|&xi| xi * xi - 10.0 * (2.0 * std::f64::consts::PI * xi).cos())
            .sum::<f64>()
}

#[test]
fn test_de_rastrigin_2d() {
    let b2 = vec![(-5.12, 5.12), (-5.12, 5.12)];
    let c2 = DEConfigBuilder::new()
        .seed(40)
        .maxiter(1000)
        .popsize(50)
        .strategy(Strategy::Rand1Exp)
        .recombination(0.9)
        .build();
    assert!(differential_evolution(&rastrigin, &b2, c2).fun < 1e-2);
}

#[test]
fn test_de_rastrigin_3d_with_polish() {
    let b3 = vec![(-5.12, 5.12); 3];
    let c3 = DEConfigBuilder::new()
        .seed(41)
        .maxiter(1000)
        .popsize(40)
        .strategy(Strategy::RandToBest1Bin)
        .recombination(0.9)
        .polish(PatternSearchConfig { initial_step: 0.01, min_step: 1e-7, maxeval: 500 })
        .build();
    let report = differential_evolution(&rastrigin, &b3, c3);
    assert!(report.fun < 1e-3, "Rastrigin function value too high: {}", report.fun);
    for &xi in report.x.iter() {
        assert!(xi.abs() < 1e-2, "Solution component too far from 0: {}", xi);
    }
}
