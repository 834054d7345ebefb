#![forbid(unsafe_code)]

//! Greedy widget pagination.
//!
//! # Algorithm
//!
//! Single pass over the active, non-pinned widgets in order:
//!
//! 1. `effective = clamp(requested, 1, columns)`.
//! 2. If `cost + effective > units_per_page` and the current page already
//!    holds a widget, close it and open a new one.
//! 3. Place the widget and add its cost.
//!
//! The last non-empty page is pushed at the end. An empty input still yields
//! one empty page so callers always have something to index.
//!
//! # Invariants
//!
//! 1. **Order preservation**: concatenating all pages reproduces the input
//!    order minus pinned and unknown ids. Pagination never reorders to pack
//!    tighter (first-fit-in-order, not optimal bin-packing).
//! 2. **Capacity**: every page's cost is `<= units_per_page`, except a page
//!    holding a single widget that alone exceeds it. Effective sizes never
//!    exceed the column count, so that only happens with a zero-row
//!    [`GridCapacity`] built as a struct literal.
//! 3. **Pinned exclusion**: pinned widgets never appear on a page.
//! 4. **Non-empty result**: `pages().len() >= 1`.

use tilepage_core::{SizeClass, SizeMap, WidgetCatalog, WidgetDescriptor, WidgetId};

use crate::{CapacityTable, GridCapacity, ViewportClass};

/// A widget assigned to a page slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedWidget {
    pub descriptor: WidgetDescriptor,
    /// Size class the user asked for.
    pub requested_size: SizeClass,
    /// Columns actually spanned at the current viewport class.
    pub effective_size: u8,
}

impl PlacedWidget {
    #[must_use]
    pub fn id(&self) -> &WidgetId {
        &self.descriptor.id
    }
}

/// One screen's worth of widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    widgets: Vec<PlacedWidget>,
    cost: u32,
}

impl Page {
    #[must_use]
    pub fn widgets(&self) -> &[PlacedWidget] {
        &self.widgets
    }

    /// Sum of effective sizes on this page.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Identifiers in slot order.
    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> + '_ {
        self.widgets.iter().map(PlacedWidget::id)
    }

    fn push(&mut self, widget: PlacedWidget) {
        self.cost += u32::from(widget.effective_size);
        self.widgets.push(widget);
    }
}

/// Result of one pagination pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pages: Vec<Page>,
    class: ViewportClass,
    capacity: GridCapacity,
}

impl Pagination {
    /// All pages; never empty.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page at `index`, if it exists.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Number of pages; always at least 1.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn viewport_class(&self) -> ViewportClass {
        self.class
    }

    #[must_use]
    pub fn capacity(&self) -> GridCapacity {
        self.capacity
    }

    /// Whether `page` exceeds capacity only because it holds one oversized widget.
    #[must_use]
    pub fn is_lone_oversized(&self, page: &Page) -> bool {
        page.len() == 1 && page.cost() > self.capacity.units_per_page()
    }

    /// All placed ids in page order.
    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> + '_ {
        self.pages.iter().flat_map(Page::ids)
    }
}

/// Stateless pagination engine parameterized by a capacity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paginator {
    capacities: CapacityTable,
}

impl Paginator {
    #[must_use]
    pub fn new(capacities: CapacityTable) -> Self {
        Self { capacities }
    }

    #[must_use]
    pub fn capacities(&self) -> &CapacityTable {
        &self.capacities
    }

    /// Capacity used for a viewport class.
    #[must_use]
    pub fn capacity_for(&self, class: ViewportClass) -> GridCapacity {
        self.capacities.for_class(class)
    }

    /// Bin-pack `order` into pages for `class`.
    ///
    /// Pinned and unknown ids are skipped. Sizes absent from `sizes` use the
    /// catalog default.
    #[must_use]
    pub fn paginate(
        &self,
        order: &[WidgetId],
        sizes: &SizeMap,
        catalog: &WidgetCatalog,
        class: ViewportClass,
    ) -> Pagination {
        let capacity = self.capacities.for_class(class);
        let units_per_page = capacity.units_per_page();

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "paginate",
            class = %class,
            widgets = order.len(),
            units_per_page
        )
        .entered();

        let mut pages = Vec::new();
        let mut current = Page::default();

        for id in order {
            let Some(descriptor) = catalog.get(id.as_str()) else {
                continue;
            };
            if descriptor.pinned {
                continue;
            }
            let requested_size = sizes.get_or(id, descriptor.default_size);
            let effective_size = requested_size.fit_to(capacity.columns);

            if !current.is_empty() && current.cost + u32::from(effective_size) > units_per_page {
                pages.push(std::mem::take(&mut current));
            }
            current.push(PlacedWidget {
                descriptor: descriptor.clone(),
                requested_size,
                effective_size,
            });
        }

        if !current.is_empty() || pages.is_empty() {
            pages.push(current);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(pages = pages.len(), "pagination complete");

        Pagination {
            pages,
            class,
            capacity,
        }
    }
}
