use super::*;

#[test]
fn linear_ramp_interpolates_and_clamps() {
    let r = Ramp::linear(0.0, 1.0, 0.0, 239.0);
    assert_eq!(r.sample(0.0), 0.0);
    assert_eq!(r.sample(1.0), 239.0);
    assert_eq!(r.sample(0.5), 119.5);
    assert_eq!(r.sample(-0.3), 0.0);
    assert_eq!(r.sample(1.7), 239.0);
    assert_eq!(r.sample(f64::NAN), 0.0);
}

#[test]
fn three_stop_ramp_peaks_in_the_middle() {
    let r = Ramp::new(vec![0.25, 0.35, 0.45], vec![0.0, 1.0, 0.0]).unwrap();
    assert_eq!(r.sample(0.1), 0.0);
    assert_eq!(r.sample(0.35), 1.0);
    assert!((r.sample(0.30) - 0.5).abs() < 1e-9);
    assert!((r.sample(0.40) - 0.5).abs() < 1e-9);
    assert_eq!(r.sample(0.9), 0.0);
}

#[test]
fn descending_output_fades() {
    let r = Ramp::linear(0.9, 1.0, 1.0, 0.0);
    assert_eq!(r.sample(0.5), 1.0);
    assert!((r.sample(0.95) - 0.5).abs() < 1e-9);
    assert_eq!(r.sample(1.0), 0.0);
}

#[test]
fn zero_width_segment_holds_left_value() {
    let r = Ramp::new(vec![0.0, 0.5, 0.5, 1.0], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    assert_eq!(r.sample(0.25), 0.5);
    assert_eq!(r.sample(0.75), 2.5);
}

#[test]
fn unvalidated_ramp_samples_without_panicking() {
    let short = Ramp {
        input: vec![0.0, 0.5, 1.0],
        output: vec![0.0, 4.0],
    };
    assert!(short.validate().is_err());
    assert_eq!(short.sample(0.25), 2.0);
    // Past the last output value the ramp holds it.
    assert_eq!(short.sample(0.7), 4.0);
    assert_eq!(short.sample(1.0), 4.0);

    let unsorted = Ramp {
        input: vec![0.0, 2.0, 1.0, 3.0],
        output: vec![0.0, 1.0, 2.0, 3.0],
    };
    assert!(unsorted.sample(1.5).is_finite());
}

#[test]
fn validate_rejects_bad_stops() {
    assert!(Ramp::new(vec![0.0], vec![1.0]).is_err());
    assert!(Ramp::new(vec![0.0, 1.0], vec![1.0]).is_err());
    assert!(Ramp::new(vec![1.0, 0.0], vec![0.0, 1.0]).is_err());
    assert!(Ramp::new(vec![0.0, f64::NAN], vec![0.0, 1.0]).is_err());
}
