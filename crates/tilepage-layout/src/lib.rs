#![forbid(unsafe_code)]

//! Responsive pagination for the widget grid.
//!
//! This crate turns the active widget order into screen-sized pages:
//!
//! - [`ViewportClass`] / [`Breakpoints`] - classify a viewport width
//! - [`GridCapacity`] / [`CapacityTable`] - columns and rows per class
//! - [`Paginator`] - greedy, order-preserving bin-packing into [`Page`]s
//! - [`PageNavigator`] - clamped page index with next/previous/go-to
//! - [`WheelPager`] - maps large wheel deltas to page steps
//!
//! Everything here is a pure function of its inputs or a tiny value type;
//! none of it touches storage.

pub mod navigator;
pub mod paginator;

pub use navigator::{DEFAULT_WHEEL_THRESHOLD, PageNavigator, PageStep, WheelPager};
pub use paginator::{Page, Pagination, Paginator, PlacedWidget};

use serde::{Deserialize, Serialize};

/// Viewport width class.
///
/// | Class    | Default width range |
/// |----------|---------------------|
/// | `Narrow` | < 768 px            |
/// | `Medium` | 768–1023 px         |
/// | `Wide`   | >= 1024 px          |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ViewportClass {
    Narrow,
    Medium,
    #[default]
    Wide,
}

impl ViewportClass {
    /// All classes in ascending order.
    pub const ALL: [ViewportClass; 3] = [
        ViewportClass::Narrow,
        ViewportClass::Medium,
        ViewportClass::Wide,
    ];

    /// Short label for display and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ViewportClass::Narrow => "narrow",
            ViewportClass::Medium => "medium",
            ViewportClass::Wide => "wide",
        }
    }
}

impl std::fmt::Display for ViewportClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Width thresholds for [`ViewportClass`].
///
/// Each field is the minimum width (in pixels) for that class. `Narrow`
/// implicitly starts at 0.
///
/// Deserialization goes through [`Breakpoints::new`]. A struct literal skips
/// that check, so an inverted pair built that way makes `Medium` unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBreakpoints")]
pub struct Breakpoints {
    /// Minimum width for `Medium`.
    pub medium: u32,
    /// Minimum width for `Wide`.
    pub wide: u32,
}

impl Breakpoints {
    /// Default breakpoints: 768 / 1024 pixels.
    pub const DEFAULT: Self = Self {
        medium: 768,
        wide: 1024,
    };

    /// Create breakpoints with explicit thresholds.
    ///
    /// `wide` is raised to `medium` if given out of order.
    #[must_use]
    pub const fn new(medium: u32, wide: u32) -> Self {
        let wide = if wide < medium { medium } else { wide };
        Self { medium, wide }
    }

    /// Classify a width into a viewport class.
    #[inline]
    #[must_use]
    pub const fn classify_width(self, width: u32) -> ViewportClass {
        if width >= self.wide {
            ViewportClass::Wide
        } else if width >= self.medium {
            ViewportClass::Medium
        } else {
            ViewportClass::Narrow
        }
    }

    /// Minimum width for a given class.
    #[must_use]
    pub const fn threshold(self, class: ViewportClass) -> u32 {
        match class {
            ViewportClass::Narrow => 0,
            ViewportClass::Medium => self.medium,
            ViewportClass::Wide => self.wide,
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Deserialize)]
struct RawBreakpoints {
    medium: u32,
    wide: u32,
}

impl From<RawBreakpoints> for Breakpoints {
    fn from(raw: RawBreakpoints) -> Self {
        Self::new(raw.medium, raw.wide)
    }
}

/// Grid dimensions for one viewport class.
///
/// Deserialization goes through [`GridCapacity::new`]. A struct literal may
/// hold zero dimensions; the paginator then places every widget on a page of
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawGridCapacity")]
pub struct GridCapacity {
    /// Columns available; also the widest span a widget may occupy.
    pub columns: u8,
    /// Rows shown on one page.
    pub max_rows_per_page: u8,
}

impl GridCapacity {
    /// Create a capacity; zero dimensions are raised to 1.
    #[must_use]
    pub const fn new(columns: u8, max_rows_per_page: u8) -> Self {
        Self {
            columns: if columns == 0 { 1 } else { columns },
            max_rows_per_page: if max_rows_per_page == 0 {
                1
            } else {
                max_rows_per_page
            },
        }
    }

    /// Column-units that fit on one page.
    #[inline]
    #[must_use]
    pub const fn units_per_page(self) -> u32 {
        self.columns as u32 * self.max_rows_per_page as u32
    }
}

#[derive(Deserialize)]
struct RawGridCapacity {
    columns: u8,
    max_rows_per_page: u8,
}

impl From<RawGridCapacity> for GridCapacity {
    fn from(raw: RawGridCapacity) -> Self {
        Self::new(raw.columns, raw.max_rows_per_page)
    }
}

/// Capacity per viewport class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityTable {
    pub narrow: GridCapacity,
    pub medium: GridCapacity,
    pub wide: GridCapacity,
}

impl CapacityTable {
    /// | Class  | columns | rows | units |
    /// |--------|---------|------|-------|
    /// | narrow | 1       | 3    | 3     |
    /// | medium | 2       | 3    | 6     |
    /// | wide   | 3       | 2    | 6     |
    pub const DEFAULT: Self = Self {
        narrow: GridCapacity::new(1, 3),
        medium: GridCapacity::new(2, 3),
        wide: GridCapacity::new(3, 2),
    };

    #[must_use]
    pub const fn for_class(&self, class: ViewportClass) -> GridCapacity {
        match class {
            ViewportClass::Narrow => self.narrow,
            ViewportClass::Medium => self.medium,
            ViewportClass::Wide => self.wide,
        }
    }
}

impl Default for CapacityTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}
