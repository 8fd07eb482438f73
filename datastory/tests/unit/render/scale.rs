use super::*;

#[test]
fn extent_skips_non_finite() {
    assert_eq!(extent([3.0, f64::NAN, -1.0, 7.5]), Some((-1.0, 7.5)));
    assert_eq!(extent(std::iter::empty()), None);
}

#[test]
fn nice_rounds_domain_outward() {
    let s = LinearScale::new((0.0, 97.3), (0.0, 100.0)).nice(10);
    assert_eq!(s.domain(), (0.0, 100.0));
    let s = LinearScale::new((53.2, 81.9), (0.0, 1.0)).nice(10);
    assert_eq!(s.domain(), (52.0, 82.0));
}

#[test]
fn ticks_use_one_two_five_steps() {
    assert_eq!(ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    assert_eq!(ticks(0.0, 1.0, 10).len(), 11);
    assert_eq!(ticks(0.0, 1.0, 10)[3], 0.3);
    assert_eq!(tick_step(1990.0, 2020.0, 10), 2.0);
    assert_eq!(tick_step(1990.0, 2020.0, 5), 5.0);
}

#[test]
fn map_is_affine_and_can_invert_range() {
    let s = LinearScale::new((0.0, 10.0), (440.0, 0.0));
    assert_eq!(s.map(0.0), 440.0);
    assert_eq!(s.map(10.0), 0.0);
    assert_eq!(s.map(5.0), 220.0);
}

#[test]
fn degenerate_domain_is_widened() {
    let s = LinearScale::new((5.0, 5.0), (0.0, 100.0));
    let (lo, hi) = s.domain();
    assert!(lo < 5.0 && hi > 5.0);
    assert!(s.map(5.0).is_finite());
    assert_eq!(LinearScale::new((0.0, 0.0), (0.0, 1.0)).domain(), (-1.0, 1.0));
    assert_eq!(LinearScale::new((3.0, 1.0), (0.0, 1.0)).domain(), (1.0, 3.0));
}

#[test]
fn tick_labels_follow_step_precision() {
    assert_eq!(format_tick(2000.0, 5.0), "2000");
    assert_eq!(format_tick(0.30000000000000004, 0.1), "0.3");
    assert_eq!(format_tick(-0.0, 0.5), "0.0");
    assert_eq!(format_tick(12.25, 0.05), "12.25");
}

#[test]
fn domains_wider_than_f64_max_stay_bounded() {
    let step = tick_step(-1e308, 1e308, 10);
    assert!((step / 2e307 - 1.0).abs() < 1e-9, "{step}");

    let s = LinearScale::new((-1e308, 1e308), (0.0, 100.0)).nice(10);
    let (lo, hi) = s.domain();
    assert!(lo.is_finite() && hi.is_finite());
    assert_eq!(s.map(lo), 0.0);
    assert_eq!(s.map(hi), 100.0);
    assert_eq!(s.map(0.0), 50.0);
    let n = s.ticks(10).len();
    assert!((11..=13).contains(&n), "{n} ticks");
}

#[test]
fn ticks_give_up_on_unbounded_or_oversized_ranges() {
    assert!(ticks(0.0, f64::INFINITY, 10).is_empty());
    assert!(ticks(f64::NAN, 1.0, 10).is_empty());
    assert!(ticks(0.0, 10.0, 0).len() <= 11);
}
