//! Property-based invariant tests for catalog filtering and size classes.
//!
//! 1. `retain_known` never yields unknown ids.
//! 2. `retain_known` never yields duplicates.
//! 3. `retain_known` preserves first-occurrence order.
//! 4. `SizeClass::clamped` always lands in `[1, 3]`.
//! 5. `fit_to` never exceeds the column count.

use std::collections::HashSet;

use proptest::prelude::*;
use tilepage_core::{SizeClass, WidgetCatalog, WidgetId};

fn raw_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("tasks".to_string()),
        Just("notes".to_string()),
        Just("weather".to_string()),
        Just("quote".to_string()),
        Just("ai_assistant".to_string()),
        Just("links".to_string()),
        Just("search".to_string()),
        "[a-z_]{1,10}",
    ]
}

proptest! {
    #[test]
    fn retain_known_only_known(raw in prop::collection::vec(raw_id_strategy(), 0..24)) {
        let catalog = WidgetCatalog::standard();
        let cleaned = catalog.retain_known(raw.into_iter().map(WidgetId::new));
        for id in &cleaned {
            prop_assert!(catalog.contains(id.as_str()), "unknown id survived: {id}");
        }
    }

    #[test]
    fn retain_known_no_duplicates(raw in prop::collection::vec(raw_id_strategy(), 0..24)) {
        let catalog = WidgetCatalog::standard();
        let cleaned = catalog.retain_known(raw.into_iter().map(WidgetId::new));
        let unique: HashSet<_> = cleaned.iter().collect();
        prop_assert_eq!(unique.len(), cleaned.len());
    }

    #[test]
    fn retain_known_preserves_first_occurrence_order(
        raw in prop::collection::vec(raw_id_strategy(), 0..24)
    ) {
        let catalog = WidgetCatalog::standard();
        let mut expected = Vec::new();
        for id in &raw {
            if catalog.contains(id) && !expected.contains(id) {
                expected.push(id.clone());
            }
        }
        let cleaned: Vec<String> = catalog
            .retain_known(raw.into_iter().map(WidgetId::new))
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect();
        prop_assert_eq!(cleaned, expected);
    }

    #[test]
    fn clamped_in_range(requested in any::<i64>()) {
        let size = SizeClass::clamped(requested);
        prop_assert!((1..=3).contains(&size.get()));
    }

    #[test]
    fn fit_to_bounded(requested in any::<i64>(), columns in 0u8..=8) {
        let fitted = SizeClass::clamped(requested).fit_to(columns);
        prop_assert!(fitted >= 1);
        prop_assert!(fitted <= columns.max(1));
    }
}
