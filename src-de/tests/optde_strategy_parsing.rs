use yawopt_de::Strategy;

#[test]
fn test_parse_strategy_variants() {
    assert!(matches!("best1exp".parse::<Strategy>().unwrap(), Strategy::Best1Exp));
    assert!(matches!("rand1".parse::<Strategy>().unwrap(), Strategy::Rand1Bin));
    assert!(matches!("randtobest1exp".parse::<Strategy>().unwrap(), Strategy::RandToBest1Exp));
    assert!(matches!(
        "current-to-best1exp".parse::<Strategy>().unwrap(),
        Strategy::CurrentToBest1Exp
    ));
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let err = "best2bin".parse::<Strategy>().unwrap_err();
    assert!(err.contains("best2bin"));
}
