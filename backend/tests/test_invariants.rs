//! Property-based invariant tests
//!
//! Random configurations and seeds, checked after every tick:
//! - queue never exceeds capacity
//! - entity placement is consistent (state, doctor, queue)
//! - every generated id is either stored or reported as rejected
//! - completion never precedes arrival

use proptest::prelude::*;
use std::collections::BTreeSet;
use triage_simulator_core_rs::{
    Event, Orchestrator, PatientId, PatientState, PolicyConfig, TriageConfig,
};

fn policy_strategy() -> impl Strategy<Value = PolicyConfig> {
    prop_oneof![
        Just(PolicyConfig::Fifo),
        Just(PolicyConfig::SeverityPriority),
        (0.0..2.0f64).prop_map(|w| PolicyConfig::PredictedUrgency {
            uncertainty_weight: w
        }),
    ]
}

fn config_strategy() -> impl Strategy<Value = TriageConfig> {
    (
        0usize..4,
        1usize..15,
        0.0..=1.0f64,
        prop::collection::vec(1usize..7, 1..4),
        any::<u64>(),
        policy_strategy(),
    )
        .prop_flat_map(|(doctors, max_queue, rate, times, seed, policy)| {
            (0..=max_queue).prop_map(move |initial| TriageConfig {
                num_doctors: doctors,
                max_queue,
                arrival_rate: rate,
                initial_numbers: initial,
                treatment_time_per_doctor: times.clone(),
                rng_seed: seed,
                policy: policy.clone(),
                ..TriageConfig::default()
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn prop_tick_invariants_hold(config in config_strategy(), ticks in 1usize..80) {
        let max_queue = config.max_queue;
        let mut orchestrator = Orchestrator::new(config).unwrap();
        let mut total_rejected = 0;

        for tick in 0..ticks {
            let result = orchestrator.step().unwrap();
            let state = orchestrator.state();

            prop_assert_eq!(result.tick, tick);
            prop_assert!(result.arrivals + result.rejected <= 1);
            prop_assert!(state.queue_len() <= max_queue);
            prop_assert!(state.check_invariants().is_ok(), "{:?}", state.check_invariants());
            prop_assert_eq!(result.queue_stats.queue_length, state.queue_len());
            prop_assert_eq!(
                result.queue_stats.urgent_count + result.queue_stats.non_urgent_count,
                result.queue_stats.queue_length
            );

            // Idle doctor with a waiting patient is never left over
            if state.queue_len() > 0 {
                prop_assert_eq!(state.num_busy_doctors(), state.num_doctors());
            }

            total_rejected += result.rejected;
        }

        let state = orchestrator.state();
        prop_assert_eq!(orchestrator.rejected_arrivals(), total_rejected);

        // Stored and rejected ids partition 0..n
        let mut ids: BTreeSet<PatientId> = state.patients().map(|p| p.id()).collect();
        for event in orchestrator.event_log().events_of_type("ArrivalRejected") {
            prop_assert!(ids.insert(event.patient_id()));
        }
        let expected: BTreeSet<PatientId> = (0..ids.len() as PatientId).collect();
        prop_assert_eq!(ids, expected);

        for case in orchestrator.completed_cases() {
            let done = case.completion_time().unwrap();
            prop_assert!(done >= case.arrival_time);
        }

        let done_patients = state.patients().filter(|p| p.state() == PatientState::Done).count();
        prop_assert_eq!(done_patients, orchestrator.completed_cases().len());
    }

    #[test]
    fn prop_same_seed_same_episode(config in config_strategy(), ticks in 1usize..60) {
        let mut a = Orchestrator::new(config.clone()).unwrap();
        let mut b = Orchestrator::new(config).unwrap();

        for _ in 0..ticks {
            prop_assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
        prop_assert_eq!(a.episode_metrics(), b.episode_metrics());
        prop_assert_eq!(a.event_log().events(), b.event_log().events());
    }

    #[test]
    fn prop_assignments_follow_completions(config in config_strategy(), ticks in 1usize..60) {
        let mut orchestrator = Orchestrator::new(config).unwrap();
        for _ in 0..ticks {
            orchestrator.step().unwrap();
        }

        // Within a tick every completion is logged before any assignment
        let mut last: Option<(usize, &str)> = None;
        for event in orchestrator.event_log().events() {
            if let (Some((tick, "Assignment")), Event::TreatmentComplete { .. }) = (last, event) {
                prop_assert!(event.tick() > tick);
            }
            last = Some((event.tick(), event.event_type()));
        }
    }
}
