//! Carousel position tracking.
//!
//! The index always stays in `[0, max_index]`, where `max_index` is the last position
//! that still fills the viewport: `items - per_view`, or zero when everything fits.

use std::time::Duration;

/// Default auto-advance interval.
pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    items: usize,
    per_view: usize,
    index: usize,
    autoplay: Option<Duration>,
}

impl Carousel {
    #[must_use]
    pub const fn new(items: usize, per_view: usize) -> Self {
        Self {
            items,
            per_view: if per_view == 0 { 1 } else { per_view },
            index: 0,
            autoplay: None,
        }
    }

    /// Enables auto-advance every `interval`.
    #[must_use]
    pub const fn with_autoplay(mut self, interval: Duration) -> Self {
        self.autoplay = Some(interval);
        self
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn max_index(&self) -> usize {
        self.items.saturating_sub(self.per_view)
    }

    pub const fn next(&mut self) {
        self.index = if self.index >= self.max_index() {
            0
        } else {
            self.index + 1
        };
    }

    pub const fn prev(&mut self) {
        self.index = if self.index == 0 {
            self.max_index()
        } else {
            self.index - 1
        };
    }

    pub fn go_to(&mut self, index: usize) {
        self.index = index.min(self.max_index());
    }

    /// Arrows and dots only make sense when not everything fits.
    #[must_use]
    pub const fn shows_controls(&self) -> bool {
        self.items > self.per_view
    }

    #[must_use]
    pub const fn dot_count(&self) -> usize {
        if self.shows_controls() {
            self.max_index() + 1
        } else {
            0
        }
    }

    /// Horizontal translation of the track, in percent of one slide width times the
    /// index.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn offset_percent(&self) -> f64 {
        -(self.index as f64) * (100.0 / self.per_view as f64)
    }

    #[must_use]
    pub const fn autoplay(&self) -> Option<Duration> {
        self.autoplay
    }

    /// Advances by however many intervals fit in `elapsed`; returns the steps taken.
    pub fn tick(&mut self, elapsed: Duration) -> u32 {
        let Some(interval) = self.autoplay.filter(|i| !i.is_zero()) else {
            return 0;
        };
        if !self.shows_controls() {
            return 0;
        }
        let steps = u32::try_from(elapsed.as_nanos() / interval.as_nanos()).unwrap_or(u32::MAX);
        let cycle = u32::try_from(self.max_index() + 1).unwrap_or(u32::MAX);
        for _ in 0..steps % cycle {
            self.next();
        }
        steps
    }
}
