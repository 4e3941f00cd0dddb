use super::*;

const DT: f64 = 1.0 / 60.0;

fn settle(spring: &mut Spring, max_ticks: usize) -> usize {
    for tick in 0..max_ticks {
        if spring.is_at_rest() {
            return tick;
        }
        spring.step(DT);
    }
    max_ticks
}

#[test]
fn default_params_are_overdamped() {
    let p = SpringParams::default();
    assert!(p.damping_ratio() > 1.0);
    p.validate().unwrap();
}

#[test]
fn new_spring_starts_at_rest() {
    let mut s = Spring::new(SpringParams::default(), 12.0);
    assert!(s.is_at_rest());
    assert_eq!(s.step(DT), 12.0);
    assert_eq!(s.velocity(), 0.0);
}

#[test]
fn converges_to_target() {
    let mut s = Spring::new(SpringParams::default(), 0.0);
    s.set_target(239.0);
    let ticks = settle(&mut s, 10_000);
    assert!(ticks < 10_000);
    assert_eq!(s.position(), 239.0);
    assert!(s.is_at_rest());
}

#[test]
fn lags_behind_a_jump_then_catches_up() {
    let mut s = Spring::new(SpringParams::default(), 0.0);
    s.set_target(119.5);
    let first = s.step(DT);
    assert!(first > 0.0 && first < 119.5, "{first}");

    let mut last = first;
    for _ in 0..30 {
        let p = s.step(DT);
        assert!(p >= last);
        last = p;
    }
    assert!(last < 119.5);

    settle(&mut s, 10_000);
    assert_eq!(s.position(), 119.5);
}

#[test]
fn increasing_targets_never_move_backwards() {
    let mut s = Spring::new(SpringParams::default(), 0.0);
    let mut last = s.position();
    for i in 0..=100 {
        let progress = i as f64 / 100.0;
        s.set_target(progress * 239.0);
        for _ in 0..2 {
            let p = s.step(DT);
            assert!(p >= last, "moved back from {last} to {p}");
            last = p;
        }
    }
    settle(&mut s, 10_000);
    assert_eq!(s.position().round(), 239.0);
}

#[test]
fn ignores_invalid_dt_and_targets() {
    let mut s = Spring::new(SpringParams::default(), 5.0);
    s.set_target(f64::NAN);
    assert_eq!(s.target(), 5.0);
    s.set_target(10.0);
    assert_eq!(s.step(0.0), 5.0);
    assert_eq!(s.step(-1.0), 5.0);
    assert_eq!(s.step(f64::INFINITY), 5.0);
}

#[test]
fn jump_to_resets_motion() {
    let mut s = Spring::new(SpringParams::default(), 0.0);
    s.set_target(100.0);
    s.step(DT);
    s.jump_to(42.0);
    assert!(s.is_at_rest());
    assert_eq!(s.position(), 42.0);
}

#[test]
fn long_gaps_are_bounded() {
    let mut s = Spring::new(SpringParams::default(), 0.0);
    s.set_target(10.0);
    let p = s.step(3600.0);
    assert!(p.is_finite());
    assert!(p > 0.0 && p <= 10.0);
}

#[test]
fn validate_rejects_non_positive_params() {
    let p = SpringParams {
        mass: 0.0,
        ..SpringParams::default()
    };
    assert!(p.validate().is_err());
    let p = SpringParams {
        stiffness: f64::NAN,
        ..SpringParams::default()
    };
    assert!(p.validate().is_err());
}
