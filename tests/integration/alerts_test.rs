use rigmon::core::rig_monitor::{
    evaluate_alert, AlertConfig, AlertKind, AlertState, Channel, Sample, Snapshot, Transition,
    NO_DATA,
};

fn snapshot(sample: Sample, offset: i64) -> Snapshot {
    Snapshot::new(1, sample, offset, true)
}

#[test]
fn test_empty_sample_raises_nothing() {
    let verdict = evaluate_alert(&snapshot(Sample::empty(), 0), &AlertConfig::default());
    assert_eq!(verdict, None);
}

#[test]
fn test_all_limits_violated_reports_temperature() {
    let sample = Sample::empty()
        .with(Channel::RearBearingTemp, 120)
        .with(Channel::HpuPressure, 130)
        .with(Channel::DrillSpeed, 0)
        .with(Channel::ScrewjackSpeed, 0)
        .with(Channel::ScrewjackPosition, 40);

    let verdict = evaluate_alert(&snapshot(sample, 0), &AlertConfig::default());
    assert_eq!(verdict, Some(AlertKind::TemperatureLimit));
}

#[test]
fn test_custom_limits_are_respected() {
    let limits = AlertConfig {
        max_pressure: 150,
        ..Default::default()
    };
    let sample = Sample::empty()
        .with(Channel::HpuPressure, 130)
        .with(Channel::DrillSpeed, 200)
        .with(Channel::ScrewjackSpeed, 12);

    assert_eq!(evaluate_alert(&snapshot(sample, 0), &limits), None);
    assert_eq!(
        evaluate_alert(&snapshot(sample, 0), &AlertConfig::default()),
        Some(AlertKind::PressureLimit)
    );
}

#[test]
fn test_missing_speed_never_looks_like_a_stall() {
    let sample = Sample::empty()
        .with(Channel::HpuPressure, 80)
        .with(Channel::DrillSpeed, NO_DATA)
        .with(Channel::ScrewjackSpeed, 0);

    assert_eq!(
        evaluate_alert(&snapshot(sample, 0), &AlertConfig::default()),
        None
    );
}

#[test]
fn test_travel_uses_zeroed_position() {
    let sample = Sample::empty().with(Channel::ScrewjackPosition, 40);

    assert_eq!(
        evaluate_alert(&snapshot(sample, 0), &AlertConfig::default()),
        Some(AlertKind::TravelLimit)
    );
    assert_eq!(
        evaluate_alert(&snapshot(sample, 30), &AlertConfig::default()),
        None
    );
}

#[test]
fn test_alert_lifecycle_transitions() {
    let state = AlertState::default();

    let (state, t) = state.transition(Some(AlertKind::Stall));
    assert_eq!(t, Transition::Raise(AlertKind::Stall));

    let (state, t) = state.transition(Some(AlertKind::Stall));
    assert_eq!(t, Transition::Hold);

    let (state, t) = state.transition(None);
    assert_eq!(t, Transition::Clear);
    assert_eq!(state, AlertState::NoCondition);

    let (_, t) = state.transition(Some(AlertKind::Stall));
    assert_eq!(t, Transition::Raise(AlertKind::Stall));
}
