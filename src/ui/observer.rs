//! Scroll-driven triggers.
//!
//! These track what a viewport observer reports and decide when to load the next page
//! or reveal an element; the caller feeds them intersection or scroll measurements.

use std::collections::BTreeSet;

/// Root margin, in pixels, before the end of the list at which loading starts.
pub const DEFAULT_THRESHOLD_PX: u32 = 200;

/// Infinite-scroll trigger attached to a sentinel at the end of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfiniteScroll {
    threshold_px: u32,
}

impl Default for InfiniteScroll {
    fn default() -> Self {
        Self {
            threshold_px: DEFAULT_THRESHOLD_PX,
        }
    }
}

impl InfiniteScroll {
    #[must_use]
    pub const fn with_threshold(threshold_px: u32) -> Self {
        Self { threshold_px }
    }

    #[must_use]
    pub const fn threshold_px(&self) -> u32 {
        self.threshold_px
    }

    /// Sentinel callback: load when it intersects, more rows exist and nothing is loading.
    #[must_use]
    pub const fn on_intersection(&self, is_intersecting: bool, has_more: bool, is_loading: bool) -> bool {
        is_intersecting && has_more && !is_loading
    }

    /// Scroll-position fallback for environments without an intersection observer.
    #[must_use]
    pub const fn on_scroll(
        &self,
        scroll_top: u32,
        viewport_height: u32,
        content_height: u32,
        has_more: bool,
        is_loading: bool,
    ) -> bool {
        let bottom = scroll_top.saturating_add(viewport_height);
        let distance = content_height.saturating_sub(bottom);
        distance < self.threshold_px && has_more && !is_loading
    }
}

/// Reveal-on-scroll for a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReveal {
    once: bool,
    visible: bool,
}

impl Default for ScrollReveal {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ScrollReveal {
    /// `once`: stay visible after the first reveal.
    #[must_use]
    pub const fn new(once: bool) -> Self {
        Self {
            once,
            visible: false,
        }
    }

    pub const fn observe(&mut self, is_intersecting: bool) {
        if is_intersecting {
            self.visible = true;
        } else if !self.once {
            self.visible = false;
        }
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Reveal-on-scroll for a list of elements, tracked by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReveal {
    once: bool,
    visible: BTreeSet<usize>,
}

impl BatchReveal {
    #[must_use]
    pub const fn new(once: bool) -> Self {
        Self {
            once,
            visible: BTreeSet::new(),
        }
    }

    pub fn observe(&mut self, index: usize, is_intersecting: bool) {
        if is_intersecting {
            self.visible.insert(index);
        } else if !self.once {
            self.visible.remove(&index);
        }
    }

    #[must_use]
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.contains(&index)
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}
