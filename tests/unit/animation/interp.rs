use super::*;

const SAMPLES: [(f64, f64); 6] = [
    (0.0, 100.0),
    (100.0, 0.0),
    (-35.5, 12.25),
    (0.1, 0.3),
    (1e9, -1e9),
    (7.0, 7.0),
];

#[test]
fn linear_hits_both_endpoints_exactly() {
    for (a, b) in SAMPLES {
        assert_eq!(linear(a, b, 0.0), a);
        assert_eq!(linear(a, b, 1.0), b);
    }
    assert_eq!(linear(0.0, 100.0, 0.5), 50.0);
}

#[test]
fn cosine_hits_both_endpoints_exactly() {
    for (a, b) in SAMPLES {
        assert_eq!(cosine(a, b, 0.0), a);
        assert_eq!(cosine(a, b, 1.0), b);
    }
}

#[test]
fn cosine_midpoint_is_the_average() {
    for (a, b) in SAMPLES {
        let mid = cosine(a, b, 0.5);
        let expected = (a + b) / 2.0;
        let tol = 1e-12 * (1.0 + a.abs().max(b.abs()));
        assert!((mid - expected).abs() <= tol, "{a} {b}: {mid}");
    }
}

#[test]
fn cosine_is_monotonic_but_not_linear() {
    let mut prev = cosine(0.0, 100.0, 0.0);
    for i in 1..=100 {
        let p = f64::from(i) / 100.0;
        let v = cosine(0.0, 100.0, p);
        assert!(v >= prev, "not monotonic at {p}");
        prev = v;
    }
    // Slow start and slow finish relative to linear motion.
    assert!(cosine(0.0, 100.0, 0.25) < linear(0.0, 100.0, 0.25));
    assert!(cosine(0.0, 100.0, 0.75) > linear(0.0, 100.0, 0.75));
}

#[test]
fn strategy_names_round_trip() {
    for s in [Strategy::Linear, Strategy::Cosine] {
        assert_eq!(Strategy::from_name(s.name()), Some(s));
    }
    assert_eq!(Strategy::from_name("Linear"), None);
    assert_eq!(Strategy::from_name("bounce"), None);
    assert_eq!(Strategy::Cosine.apply(0.0, 10.0, 1.0), 10.0);
}
