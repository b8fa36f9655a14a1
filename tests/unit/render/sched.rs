use std::time::{Duration, Instant};

use super::*;

#[test]
fn burst_of_schedules_fires_exactly_once() {
    let mut sched = RenderScheduler::new();
    let t0 = Instant::now();

    for i in 0..50 {
        sched.schedule(t0 + Duration::from_micros(i));
    }
    assert!(sched.is_pending());

    // Nothing fires inside the window.
    assert!(!sched.take_due(t0 + Duration::from_millis(1)));

    // Exactly one fire once the window elapses.
    let after = t0 + FRAME_WINDOW + Duration::from_millis(1);
    assert!(sched.take_due(after));
    assert!(!sched.take_due(after));
    assert!(!sched.is_pending());
}

#[test]
fn rescheduling_does_not_extend_the_window() {
    let mut sched = RenderScheduler::new();
    let t0 = Instant::now();

    sched.schedule(t0);
    // A late second schedule must not push the deadline out.
    sched.schedule(t0 + FRAME_WINDOW - Duration::from_millis(1));
    assert!(sched.take_due(t0 + FRAME_WINDOW));
}

#[test]
fn rearms_after_a_fire() {
    let mut sched = RenderScheduler::with_window(Duration::from_millis(5));
    let t0 = Instant::now();

    sched.schedule(t0);
    assert!(sched.take_due(t0 + Duration::from_millis(5)));

    sched.schedule(t0 + Duration::from_millis(6));
    assert!(!sched.take_due(t0 + Duration::from_millis(8)));
    assert!(sched.take_due(t0 + Duration::from_millis(11)));
}

#[test]
fn idle_scheduler_never_fires() {
    let mut sched = RenderScheduler::new();
    assert!(!sched.is_pending());
    assert!(!sched.take_due(Instant::now() + Duration::from_secs(60)));
}

#[test]
fn reset_disarms() {
    let mut sched = RenderScheduler::new();
    let t0 = Instant::now();
    sched.schedule(t0);
    sched.reset();
    assert!(!sched.take_due(t0 + FRAME_WINDOW + Duration::from_secs(1)));
}
