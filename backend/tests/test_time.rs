//! Tests for TimeManager

use triage_simulator_core_rs::TimeManager;

#[test]
fn test_time_manager_new() {
    let time = TimeManager::new(1.0);
    assert_eq!(time.current_tick(), 0);
    assert_eq!(time.elapsed_minutes(), 0.0);
}

#[test]
fn test_advance_tick() {
    let mut time = TimeManager::new(1.0);

    time.advance_tick();
    assert_eq!(time.current_tick(), 1);

    time.advance_tick();
    assert_eq!(time.current_tick(), 2);
}

#[test]
fn test_minutes_scale_with_tick_length() {
    let mut time = TimeManager::new(5.0);
    for _ in 0..12 {
        time.advance_tick();
    }

    assert_eq!(time.current_tick(), 12);
    assert_eq!(time.elapsed_minutes(), 60.0); // one hour
    assert_eq!(time.ticks_to_minutes(3), 15.0);
}

#[test]
fn test_fractional_tick_length() {
    let time = TimeManager::at_tick(10, 0.5);
    assert_eq!(time.minutes_per_tick(), 0.5);
    assert_eq!(time.elapsed_minutes(), 5.0);
}

#[test]
#[should_panic(expected = "minutes_per_tick must be positive")]
fn test_negative_tick_length_panics() {
    TimeManager::new(-1.0);
}
