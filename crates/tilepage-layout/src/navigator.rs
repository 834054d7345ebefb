#![forbid(unsafe_code)]

//! Page navigation.
//!
//! [`PageNavigator`] owns the current page index and keeps it inside
//! `[0, page_count - 1]` at all times. When pagination output changes, the
//! owner calls [`PageNavigator::sync_page_count`] and the index is clamped
//! immediately rather than on the next navigation call.
//!
//! [`WheelPager`] converts raw wheel deltas into discrete page steps so small
//! trackpad jitters do not flip pages.

use serde::{Deserialize, Serialize};

/// Default wheel magnitude that counts as one page step.
pub const DEFAULT_WHEEL_THRESHOLD: u32 = 50;

/// Discrete navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStep {
    Advance,
    Retreat,
}

/// Clamped page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNavigator {
    current: usize,
    page_count: usize,
}

impl Default for PageNavigator {
    fn default() -> Self {
        Self {
            current: 0,
            page_count: 1,
        }
    }
}

impl PageNavigator {
    /// Navigator on page 0 of `page_count` (treated as at least 1).
    #[must_use]
    pub fn new(page_count: usize) -> Self {
        Self {
            current: 0,
            page_count: page_count.max(1),
        }
    }

    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.current + 1 >= self.page_count
    }

    /// Advance one page, stopping at the last. Returns whether the index moved.
    pub fn next(&mut self) -> bool {
        self.set(self.current.saturating_add(1))
    }

    /// Go back one page, stopping at 0. Returns whether the index moved.
    pub fn previous(&mut self) -> bool {
        self.set(self.current.saturating_sub(1))
    }

    /// Jump to `index`, clamped into range. Returns whether the index moved.
    pub fn go_to(&mut self, index: usize) -> bool {
        self.set(index)
    }

    /// Apply a discrete step.
    pub fn step(&mut self, step: PageStep) -> bool {
        match step {
            PageStep::Advance => self.next(),
            PageStep::Retreat => self.previous(),
        }
    }

    /// Adopt a new page count and clamp the index into it.
    ///
    /// Returns whether the index had to move.
    pub fn sync_page_count(&mut self, page_count: usize) -> bool {
        self.page_count = page_count.max(1);
        let before = self.current;
        self.current = self.clamp(self.current);
        before != self.current
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.page_count - 1)
    }

    fn set(&mut self, index: usize) -> bool {
        let index = self.clamp(index);
        let moved = index != self.current;
        self.current = index;
        moved
    }
}

/// Wheel-delta to page-step filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelPager {
    /// Deltas with magnitude strictly greater than this page once.
    pub threshold: u32,
}

impl Default for WheelPager {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_WHEEL_THRESHOLD,
        }
    }
}

impl WheelPager {
    #[must_use]
    pub const fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Map a vertical wheel delta to a step; small deltas are ignored.
    #[must_use]
    pub fn classify(&self, delta_y: i32) -> Option<PageStep> {
        if delta_y.unsigned_abs() <= self.threshold {
            return None;
        }
        if delta_y > 0 {
            Some(PageStep::Advance)
        } else {
            Some(PageStep::Retreat)
        }
    }
}
