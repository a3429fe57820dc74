//! Arrival generator tests

use triage_simulator_core_rs::arrivals::{ArrivalConfig, ArrivalGenerator, SeverityScorer, UrgencyScorer};
use triage_simulator_core_rs::{Patient, PatientState, RngManager};

fn generator(rate: f64) -> ArrivalGenerator {
    ArrivalGenerator::new(ArrivalConfig {
        arrival_rate: rate,
        max_severity: 30.0,
    })
}

#[test]
fn test_rate_one_arrives_every_tick() {
    let mut gen = generator(1.0);
    let mut rng = RngManager::new(42);

    for tick in 0..50 {
        let patient = gen.generate(tick, &mut rng).expect("arrival expected");
        assert_eq!(patient.id(), tick as u64);
        assert_eq!(patient.arrival_time(), tick);
        assert_eq!(patient.state(), PatientState::Waiting);
    }
    assert_eq!(gen.next_patient_id(), 50);
}

#[test]
fn test_ids_strictly_increasing_from_zero() {
    let mut gen = generator(0.5);
    let mut rng = RngManager::new(3);

    let ids: Vec<u64> = (0..300)
        .filter_map(|tick| gen.generate(tick, &mut rng))
        .map(|p| p.id())
        .collect();

    assert!(!ids.is_empty());
    for (expected, id) in ids.iter().enumerate() {
        assert_eq!(*id, expected as u64);
    }
}

#[test]
fn test_arrival_frequency_near_rate() {
    let mut gen = generator(0.3);
    let mut rng = RngManager::new(12345);

    let arrivals = (0..10_000)
        .filter(|tick| gen.generate(*tick, &mut rng).is_some())
        .count();
    assert!((2_700..3_300).contains(&arrivals), "got {} arrivals", arrivals);
}

#[test]
fn test_severity_within_bounds() {
    let mut gen = ArrivalGenerator::new(ArrivalConfig {
        arrival_rate: 1.0,
        max_severity: 10.0,
    });
    let mut rng = RngManager::new(8);

    for tick in 0..1_000 {
        let p = gen.generate(tick, &mut rng).unwrap();
        assert!(p.severity() >= 0.0 && p.severity() <= 10.0);
    }
}

#[test]
fn test_failed_trial_consumes_single_draw() {
    let mut gen = generator(0.0);
    let mut rng = RngManager::new(77);
    let mut reference = RngManager::new(77);

    assert!(gen.generate(0, &mut rng).is_none());
    reference.next();
    assert_eq!(rng.get_state(), reference.get_state());
}

#[test]
fn test_severity_scorer_normalizes() {
    let mut scorer = SeverityScorer::new(30.0);

    assert_eq!(scorer.score(&Patient::new(0, 0.0, 0)).pred_urgency, 0.0);
    assert_eq!(scorer.score(&Patient::new(1, 30.0, 0)).pred_urgency, 1.0);
    assert_eq!(scorer.score(&Patient::new(2, 45.0, 0)).pred_urgency, 1.0);
}
