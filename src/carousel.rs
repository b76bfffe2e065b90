use std::time::{Duration, Instant};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselPhase {
    Advancing,
    Paused,
    /// Scrolled onto the duplicate half; jump back once the scroll animation has settled.
    Correcting { deadline: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselTiming {
    pub interval: Duration,
    pub scroll_delay: Duration,
    pub reduced_motion: bool,
}

impl CarouselTiming {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval: config.carousel_interval,
            scroll_delay: config.carousel_scroll_delay,
            reduced_motion: config.reduced_motion,
        }
    }
}

/// Auto-advancing strip over a doubled list. The renderer reads `index`/`offset`
/// and decides how to draw; nothing here knows about widgets.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    step: f64,
    timing: CarouselTiming,
    phase: CarouselPhase,
    index: usize,
    offset: f64,
    smooth: bool,
    last_advance: Instant,
    hovered: bool,
    /// Set by an explicit pause toggle; pointer movement never clears it.
    pinned: bool,
}

impl Carousel {
    pub fn new(len: usize, step: f64, timing: CarouselTiming, now: Instant) -> Self {
        Self {
            len,
            step: if step > 0.0 { step } else { 1.0 },
            timing,
            phase: CarouselPhase::Advancing,
            index: 0,
            offset: 0.0,
            smooth: true,
            last_advance: now,
            hovered: false,
            pinned: false,
        }
    }

    /// New data replaces the list and rewinds to the start.
    pub fn reset(&mut self, len: usize, now: Instant) {
        self.len = len;
        self.index = 0;
        self.offset = 0.0;
        self.smooth = true;
        self.last_advance = now;
        if !matches!(self.phase, CarouselPhase::Paused) {
            self.phase = CarouselPhase::Advancing;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of cards in the rendered strip.
    pub fn display_len(&self) -> usize {
        self.len * 2
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// False for the single frame in which the seam correction jumps back.
    pub fn smooth(&self) -> bool {
        self.smooth
    }

    pub fn phase(&self) -> CarouselPhase {
        self.phase
    }

    fn can_move(&self) -> bool {
        !self.timing.reduced_motion && self.len > 1
    }

    /// Advances the timer. Returns true when the strip moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.can_move() {
            return false;
        }
        match self.phase {
            CarouselPhase::Paused => false,
            CarouselPhase::Correcting { deadline } => {
                if now < deadline {
                    return false;
                }
                self.correct_seam();
                self.phase = CarouselPhase::Advancing;
                true
            }
            CarouselPhase::Advancing => {
                self.smooth = true;
                if now.saturating_duration_since(self.last_advance) < self.timing.interval {
                    return false;
                }
                self.last_advance = now;
                self.index += 1;
                self.offset = self.index as f64 * self.step;
                if self.index >= self.len {
                    self.phase = CarouselPhase::Correcting {
                        deadline: now + self.timing.scroll_delay,
                    };
                }
                true
            }
        }
    }

    fn correct_seam(&mut self) {
        if self.len == 0 || self.index < self.len {
            return;
        }
        self.index %= self.len;
        self.offset = self.index as f64 * self.step;
        self.smooth = false;
    }

    fn pause(&mut self) {
        if let CarouselPhase::Correcting { .. } = self.phase {
            self.correct_seam();
        }
        self.phase = CarouselPhase::Paused;
    }

    fn resume(&mut self, now: Instant) {
        if self.phase == CarouselPhase::Paused {
            self.phase = CarouselPhase::Advancing;
            self.last_advance = now;
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn hover(&mut self, _now: Instant) {
        self.hovered = true;
        self.pause();
    }

    /// Pointer left the strip. Only undoes the pause that hovering created.
    pub fn leave(&mut self, now: Instant) {
        self.hovered = false;
        if !self.pinned {
            self.resume(now);
        }
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        self.pinned = !self.pinned;
        if self.pinned {
            self.pause();
        } else if !self.hovered {
            self.resume(now);
        }
    }

    /// Resyncs the tracked index after the user scrolled the strip by hand.
    pub fn on_manual_scroll(&mut self, offset: f64) {
        if self.len == 0 {
            return;
        }
        let max_offset = (self.display_len() - 1) as f64 * self.step;
        self.offset = offset.clamp(0.0, max_offset);
        self.index = (self.offset / self.step).round() as usize;
        // Landing on the duplicate half snaps back to the matching original card.
        self.correct_seam();
        if let CarouselPhase::Correcting { .. } = self.phase {
            self.phase = CarouselPhase::Advancing;
        }
    }

    pub fn scroll_by(&mut self, cards: isize) {
        let target = self.offset + cards as f64 * self.step;
        self.on_manual_scroll(target);
    }

    /// Source positions for `count` cards starting at the current index.
    pub fn visible(&self, count: usize) -> Vec<usize> {
        if self.len == 0 {
            return Vec::new();
        }
        (0..count.min(self.display_len()))
            .map(|i| (self.index + i) % self.len)
            .collect()
    }
}
