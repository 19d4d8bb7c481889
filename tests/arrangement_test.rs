use holiday_ngin::animation::{Arrangement, ArrangementMachine, ArrangementTimings, PendingTimers};

fn machine(start: Arrangement) -> ArrangementMachine {
    ArrangementMachine::new(0.0, start, ArrangementTimings::default())
}

/// Steps the machine in engine-sized ticks and records every automatic flip.
fn run(machine: &mut ArrangementMachine, from: f32, to: f32) -> Vec<(f32, Arrangement)> {
    let mut flips = Vec::new();
    let mut now = from;
    while now <= to {
        if let Some(arrangement) = machine.tick(now) {
            flips.push((now, arrangement));
        }
        now += 0.05;
    }
    flips
}

#[test]
fn auto_play_alternates_with_dwell_times() {
    let mut m = machine(Arrangement::Tree);
    let flips = run(&mut m, 0.0, 25.0);

    let times: Vec<_> = flips.iter().map(|(t, _)| *t).collect();
    let expected = [8.0, 12.0, 20.0, 24.0];
    assert_eq!(times.len(), expected.len(), "flips: {flips:?}");
    for (t, e) in times.iter().zip(expected) {
        assert!((t - e).abs() < 0.25, "flip at {t}, expected {e}");
    }
    let arrangements: Vec<_> = flips.iter().map(|(_, a)| *a).collect();
    assert_eq!(
        arrangements,
        vec![
            Arrangement::Scattered,
            Arrangement::Tree,
            Arrangement::Scattered,
            Arrangement::Tree
        ]
    );
}

#[test]
fn auto_mode_has_exactly_one_transition_pending() {
    let mut m = machine(Arrangement::Scattered);
    assert!(m.is_auto());
    assert_eq!(
        m.pending(),
        PendingTimers {
            transition: Some(4.0),
            resume: None
        }
    );
    m.tick(4.0);
    assert_eq!(m.current(), Arrangement::Tree);
    assert_eq!(
        m.pending(),
        PendingTimers {
            transition: Some(12.0),
            resume: None
        }
    );
}

#[test]
fn manual_toggle_mid_dwell_suspends_auto_play() {
    let mut m = machine(Arrangement::Tree);
    run(&mut m, 0.0, 5.0);

    assert_eq!(m.on_user_action(5.0), Arrangement::Scattered);
    assert!(!m.is_auto());
    assert_eq!(
        m.pending(),
        PendingTimers {
            transition: None,
            resume: Some(15.0)
        }
    );

    // the original dwell would have fired at 8s
    let flips = run(&mut m, 5.0, 14.9);
    assert!(flips.is_empty(), "unexpected flips {flips:?}");
    assert_eq!(m.current(), Arrangement::Scattered);
    assert!(!m.is_auto());
}

#[test]
fn auto_play_resumes_after_the_idle_period() {
    let mut m = machine(Arrangement::Tree);
    m.on_user_action(5.0);

    assert_eq!(m.tick(15.0), None);
    assert!(m.is_auto());
    assert_eq!(
        m.pending(),
        PendingTimers {
            transition: Some(19.0),
            resume: None
        }
    );
    assert_eq!(m.tick(19.0), Some(Arrangement::Tree));
}

#[test]
fn repeated_toggles_reset_the_idle_window() {
    let mut m = machine(Arrangement::Tree);
    m.on_user_action(1.0);
    m.on_user_action(1.4);
    m.on_user_action(1.8);
    assert_eq!(m.current(), Arrangement::Scattered);
    let resume = m.pending().resume.expect("manual mode keeps a resume deadline");
    assert!((resume - 11.8).abs() < 1e-4);
    assert_eq!(m.pending().transition, None);

    m.tick(11.0);
    assert!(!m.is_auto(), "resumed after the first toggle instead of the last");
    m.tick(11.85);
    assert!(m.is_auto());
}

#[test]
fn timers_never_stack() {
    let mut m = machine(Arrangement::Tree);
    let mut now = 0.0;
    for i in 0..200 {
        if i % 7 == 0 {
            m.on_user_action(now);
        } else {
            m.tick(now);
        }
        let pending = m.pending();
        if m.is_auto() {
            assert!(pending.transition.is_some() && pending.resume.is_none());
        } else {
            assert!(pending.transition.is_none() && pending.resume.is_some());
        }
        now += 0.37;
    }
}

#[test]
fn arrangement_targets_and_toggle() {
    assert_eq!(Arrangement::Tree.target_factor(), 1.0);
    assert_eq!(Arrangement::Scattered.target_factor(), 0.0);
    assert_eq!(Arrangement::Tree.toggled(), Arrangement::Scattered);
    assert_eq!(Arrangement::Scattered.toggled().toggled(), Arrangement::Scattered);
}
