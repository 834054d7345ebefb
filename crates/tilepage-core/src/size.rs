#![forbid(unsafe_code)]

//! Widget size classes.
//!
//! A size class is the number of grid columns a widget wants to span on a
//! wide viewport. Stored values are always within `[SizeClass::MIN, SizeClass::MAX]`;
//! the paginator further narrows them to the columns actually available.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::WidgetId;

/// Requested column span of a widget, clamped to `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SizeClass(u8);

impl SizeClass {
    /// Smallest size class (one column).
    pub const MIN: Self = Self(1);
    /// Largest size class (three columns).
    pub const MAX: Self = Self(3);

    /// Clamp an arbitrary request into `[MIN, MAX]`.
    #[must_use]
    pub const fn clamped(requested: i64) -> Self {
        if requested < Self::MIN.0 as i64 {
            Self::MIN
        } else if requested > Self::MAX.0 as i64 {
            Self::MAX
        } else {
            Self(requested as u8)
        }
    }

    /// Column span as a plain integer.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Span limited to the given column count (never below 1).
    #[inline]
    #[must_use]
    pub const fn fit_to(self, columns: u8) -> u8 {
        let columns = if columns == 0 { 1 } else { columns };
        if self.0 > columns { columns } else { self.0 }
    }
}

impl Default for SizeClass {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<u8> for SizeClass {
    fn from(value: u8) -> Self {
        Self::clamped(i64::from(value))
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Stored values outside the range are clamped rather than rejected.
impl<'de> Deserialize<'de> for SizeClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(Self::clamped(raw))
    }
}

/// Per-widget size preferences.
///
/// Identifiers absent from the map fall back to a default supplied by the
/// caller (normally the catalog's default size).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeMap(BTreeMap<WidgetId, SizeClass>);

impl SizeMap {
    /// Create an empty size map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored size for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &WidgetId) -> Option<SizeClass> {
        self.0.get(id).copied()
    }

    /// Stored size for `id`, or `fallback` when absent.
    #[must_use]
    pub fn get_or(&self, id: &WidgetId, fallback: SizeClass) -> SizeClass {
        self.get(id).unwrap_or(fallback)
    }

    /// Store a size, returning the previous value.
    pub fn insert(&mut self, id: WidgetId, size: SizeClass) -> Option<SizeClass> {
        self.0.insert(id, size)
    }

    /// Drop a stored size.
    pub fn remove(&mut self, id: &WidgetId) -> Option<SizeClass> {
        self.0.remove(id)
    }

    /// Keep only entries matching the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&WidgetId, SizeClass) -> bool) {
        self.0.retain(|id, size| keep(id, *size));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&WidgetId, SizeClass)> + '_ {
        self.0.iter().map(|(id, size)| (id, *size))
    }
}

impl FromIterator<(WidgetId, SizeClass)> for SizeMap {
    fn from_iter<I: IntoIterator<Item = (WidgetId, SizeClass)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
