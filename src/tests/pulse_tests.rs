use super::{advance, PulseDirection, PulseFrame, PulseGenerator, PulseSettings, PulseValue};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

fn fast_settings() -> PulseSettings {
    PulseSettings {
        interval: Duration::from_millis(5),
        step: 5,
    }
}

fn generator() -> (PulseGenerator, Receiver<PulseFrame>) {
    let (tx, rx) = mpsc::channel();
    (PulseGenerator::new(fast_settings(), tx), rx)
}

fn wait_for_frame(rx: &Receiver<PulseFrame>) -> PulseFrame {
    rx.recv_timeout(Duration::from_secs(2)).expect("pulse frame")
}

#[test]
fn advance_decreases_then_reverses_at_zero() {
    let (value, direction) = advance(PulseValue::MAX, PulseDirection::Decreasing, 5);
    assert_eq!(value, PulseValue::new(250));
    assert_eq!(direction, PulseDirection::Decreasing);

    let (value, direction) = advance(PulseValue::new(5), PulseDirection::Decreasing, 5);
    assert_eq!(value, PulseValue::MIN);
    assert_eq!(direction, PulseDirection::Increasing);
}

#[test]
fn advance_clamps_overshoot_and_reverses() {
    let (value, direction) = advance(PulseValue::new(253), PulseDirection::Increasing, 5);
    assert_eq!(value, PulseValue::MAX);
    assert_eq!(direction, PulseDirection::Decreasing);

    let (value, direction) = advance(PulseValue::new(2), PulseDirection::Decreasing, 5);
    assert_eq!(value, PulseValue::MIN);
    assert_eq!(direction, PulseDirection::Increasing);
}

#[test]
fn long_runs_stay_bounded_and_flip_once_per_touch() {
    for step in [1u8, 3, 5, 7, 64, 255] {
        let mut value = PulseValue::MAX;
        let mut direction = PulseDirection::Decreasing;
        for _ in 0..5_000 {
            let (next, next_direction) = advance(value, direction, step);
            if next_direction != direction {
                assert!(next.is_bound(), "flip away from a bound at step {step}");
            }
            if next.is_bound() {
                assert_ne!(next_direction, direction, "bound touched without flip");
            }
            // A bound is never delivered twice in a row.
            assert!(!(next.is_bound() && next == value));
            value = next;
            direction = next_direction;
        }
    }
}

#[test]
fn generator_delivers_frames_from_the_seed() {
    let (mut pulse, rx) = generator();
    assert!(pulse.start(PulseValue::MAX, PulseDirection::Decreasing));
    let first = wait_for_frame(&rx);
    let second = wait_for_frame(&rx);
    assert_eq!(first.value, PulseValue::new(250));
    assert_eq!(second.value, PulseValue::new(245));
    assert_eq!(Some(first.session), pulse.active_session());
    pulse.shutdown();
    assert_eq!(pulse.active_workers(), 0);
}

#[test]
fn second_start_is_a_no_op_while_running() {
    let (mut pulse, rx) = generator();
    assert!(pulse.start(PulseValue::MAX, PulseDirection::Decreasing));
    let _ = wait_for_frame(&rx);
    assert!(!pulse.start(PulseValue::MAX, PulseDirection::Decreasing));
    assert_eq!(pulse.active_workers(), 1);

    let sessions = (0..10)
        .map(|_| wait_for_frame(&rx).session)
        .collect::<Vec<u64>>();
    assert!(sessions.iter().all(|session| *session == sessions[0]));
    pulse.shutdown();
    assert_eq!(pulse.peak_workers(), 1);
}

#[test]
fn stop_then_immediate_start_never_overlaps_workers() {
    let (mut pulse, rx) = generator();
    for _ in 0..25 {
        pulse.start(PulseValue::MAX, PulseDirection::Decreasing);
        pulse.stop();
        assert!(!pulse.is_running());
        assert!(pulse.start(PulseValue::MAX, PulseDirection::Decreasing));
        pulse.stop();
    }
    pulse.shutdown();
    assert_eq!(pulse.peak_workers(), 1);
    assert_eq!(pulse.active_workers(), 0);
    drop(rx);
}

#[test]
fn stop_returns_without_waiting_for_the_worker() {
    let (tx, _rx) = mpsc::channel();
    let mut pulse = PulseGenerator::new(
        PulseSettings {
            interval: Duration::from_secs(30),
            step: 5,
        },
        tx,
    );
    pulse.start(PulseValue::MAX, PulseDirection::Decreasing);
    let started = Instant::now();
    pulse.stop();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(pulse.active_session(), None);

    // The stop command wakes the worker instead of letting it sleep out the interval.
    let deadline = Instant::now() + Duration::from_secs(2);
    while pulse.active_workers() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(pulse.active_workers(), 0);
}

#[test]
fn restart_uses_a_new_session() {
    let (mut pulse, rx) = generator();
    pulse.start(PulseValue::MAX, PulseDirection::Decreasing);
    let first = wait_for_frame(&rx).session;
    pulse.stop();
    pulse.start(PulseValue::MAX, PulseDirection::Decreasing);
    assert_eq!(pulse.active_session(), Some(first + 1));
    pulse.shutdown();
}

#[test]
fn worker_exits_when_frame_receiver_is_dropped() {
    let (mut pulse, rx) = generator();
    pulse.start(PulseValue::MAX, PulseDirection::Decreasing);
    drop(rx);
    let deadline = Instant::now() + Duration::from_secs(2);
    while pulse.active_workers() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(pulse.active_workers(), 0);
    assert!(!pulse.is_running());
}
