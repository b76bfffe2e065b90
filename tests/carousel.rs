use std::time::{Duration, Instant};

use epl_terminal::carousel::{Carousel, CarouselPhase, CarouselTiming};

const STEP: f64 = 24.0;

fn timing(reduced_motion: bool) -> CarouselTiming {
    CarouselTiming {
        interval: Duration::from_millis(4000),
        scroll_delay: Duration::from_millis(600),
        reduced_motion,
    }
}

#[test]
fn three_items_wrap_back_to_the_start() {
    let start = Instant::now();
    let mut c = Carousel::new(3, STEP, timing(false), start);
    assert_eq!(c.display_len(), 6);

    let mut now = start;
    for expected in 1..=3 {
        now += Duration::from_millis(4000);
        assert!(c.tick(now));
        assert_eq!(c.index(), expected);
    }
    // Third advance lands on the duplicate of item 0.
    assert_eq!(c.offset(), 3.0 * STEP);
    assert_eq!(c.visible(1), vec![0]);
    assert!(matches!(c.phase(), CarouselPhase::Correcting { .. }));

    assert!(!c.tick(now + Duration::from_millis(599)));
    assert_eq!(c.index(), 3);

    assert!(c.tick(now + Duration::from_millis(600)));
    assert!(c.index() < c.len());
    assert_eq!(c.index(), 0);
    assert_eq!(c.offset(), 0.0);
    assert!(!c.smooth());
    assert_eq!(c.phase(), CarouselPhase::Advancing);

    // Next advance counts from the original timer, not the correction.
    assert!(c.tick(now + Duration::from_millis(4000)));
    assert!(c.smooth());
    assert_eq!(c.index(), 1);
    assert_eq!(c.offset(), STEP);
}

#[test]
fn index_stays_in_range_over_many_cycles() {
    let start = Instant::now();
    let mut c = Carousel::new(3, STEP, timing(false), start);
    let mut now = start;
    for _ in 0..40 {
        now += Duration::from_millis(700);
        c.tick(now);
        assert!(c.index() <= c.len());
        if c.phase() == CarouselPhase::Advancing {
            assert!(c.index() < c.len());
        }
    }
}

#[test]
fn reduced_motion_never_advances() {
    let start = Instant::now();
    let mut c = Carousel::new(5, STEP, timing(true), start);
    assert!(!c.tick(start + Duration::from_secs(60)));
    assert_eq!(c.index(), 0);
    assert_eq!(c.offset(), 0.0);
}

#[test]
fn toggle_pause_freezes_and_resumes() {
    let start = Instant::now();
    let mut c = Carousel::new(4, STEP, timing(false), start);
    c.toggle_pause(start);
    assert_eq!(c.phase(), CarouselPhase::Paused);
    assert!(!c.tick(start + Duration::from_secs(30)));

    let resumed = start + Duration::from_secs(30);
    c.toggle_pause(resumed);
    assert_eq!(c.phase(), CarouselPhase::Advancing);
    assert!(c.tick(resumed + Duration::from_millis(4000)));
    assert_eq!(c.index(), 1);
}

#[test]
fn reset_rewinds_but_keeps_a_pause() {
    let start = Instant::now();
    let mut c = Carousel::new(4, STEP, timing(false), start);
    c.scroll_by(2);
    assert_eq!(c.index(), 2);
    c.hover(start);
    c.reset(6, start);
    assert_eq!(c.len(), 6);
    assert_eq!(c.index(), 0);
    assert_eq!(c.phase(), CarouselPhase::Paused);
}

#[test]
fn empty_strip_shows_nothing() {
    let start = Instant::now();
    let mut c = Carousel::new(0, STEP, timing(false), start);
    assert!(c.is_empty());
    assert!(c.visible(4).is_empty());
    assert!(!c.tick(start + Duration::from_secs(10)));
    c.scroll_by(3);
    assert_eq!(c.index(), 0);
}

#[test]
fn scrolling_to_the_last_card_still_wraps_into_range() {
    let start = Instant::now();
    let mut c = Carousel::new(3, STEP, timing(false), start);
    c.scroll_by(5);
    assert!(c.index() < c.len());
    assert_eq!(c.index(), 2);
    assert_eq!(c.offset(), 2.0 * STEP);

    let advanced = start + Duration::from_millis(4000);
    assert!(c.tick(advanced));
    assert!(c.offset() <= (c.display_len() - 1) as f64 * STEP);
    assert!(c.tick(advanced + Duration::from_millis(600)));
    assert_eq!(c.index(), 0);
    assert_eq!(c.offset(), 0.0);
    assert_eq!(c.phase(), CarouselPhase::Advancing);

    let mut now = advanced + Duration::from_millis(600);
    for _ in 0..12 {
        now += Duration::from_millis(700);
        c.scroll_by(1);
        c.tick(now);
        assert!(c.index() <= c.len());
        assert!(c.offset() <= (c.display_len() - 1) as f64 * STEP);
    }
}

#[test]
fn pointer_leaving_does_not_undo_a_toggled_pause() {
    let start = Instant::now();
    let mut c = Carousel::new(4, STEP, timing(false), start);
    c.toggle_pause(start);
    assert!(c.is_pinned());

    c.hover(start);
    c.leave(start + Duration::from_secs(1));
    assert_eq!(c.phase(), CarouselPhase::Paused);
    assert!(!c.tick(start + Duration::from_secs(30)));

    c.hover(start + Duration::from_secs(31));
    c.toggle_pause(start + Duration::from_secs(32));
    assert_eq!(c.phase(), CarouselPhase::Paused);
    c.leave(start + Duration::from_secs(33));
    assert_eq!(c.phase(), CarouselPhase::Advancing);
}
