//! Listing view tests
//!
//! Tests for the public listing grid and map including:
//! - Price tier ordering
//! - Non-active listings never reach the public view
//! - Text filter matches exactly the searchable fields

use chrono::Utc;
use proptest::prelude::*;
use serde_json::json;
use shared::listing_view::{
    filter_and_sort, map_markers, matches_text, public_listings, ListingQuery, MapViewport,
    SortOrder,
};
use shared::{Listing, ListingStatus, PriceLevel};
use uuid::Uuid;

fn listing(name: &str, status: ListingStatus, pricing: Option<PriceLevel>) -> Listing {
    let now = Utc::now();
    serde_json::from_value(json!({
        "id": Uuid::new_v4(),
        "name": name,
        "address": "100 State St",
        "city": "Chicago",
        "state": "IL",
        "status": status,
        "pricing": pricing,
        "created_at": now,
        "updated_at": now,
    }))
    .unwrap()
}

// ============================================================================
// Strategies
// ============================================================================

fn status_strategy() -> impl Strategy<Value = ListingStatus> {
    prop_oneof![
        Just(ListingStatus::Pending),
        Just(ListingStatus::Active),
        Just(ListingStatus::Suspended),
        Just(ListingStatus::Closed),
    ]
}

fn price_strategy() -> impl Strategy<Value = Option<PriceLevel>> {
    prop_oneof![
        Just(None),
        Just(Some(PriceLevel::Budget)),
        Just(Some(PriceLevel::Moderate)),
        Just(Some(PriceLevel::Upscale)),
        Just(Some(PriceLevel::Premium)),
    ]
}

fn listings_strategy() -> impl Strategy<Value = Vec<Listing>> {
    prop::collection::vec(
        ("[A-Za-z ]{1,16}", status_strategy(), price_strategy()),
        0..20,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .map(|(name, status, price)| listing(&name, status, price))
            .collect()
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_price_sort_ascending_and_descending() {
        let source = vec![
            listing("Premium", ListingStatus::Active, Some(PriceLevel::Premium)),
            listing("Budget", ListingStatus::Active, Some(PriceLevel::Budget)),
            listing("Upscale", ListingStatus::Active, Some(PriceLevel::Upscale)),
            listing("Moderate", ListingStatus::Active, Some(PriceLevel::Moderate)),
        ];

        let low = filter_and_sort(
            &source,
            &ListingQuery {
                sort: SortOrder::PriceLow,
                ..Default::default()
            },
        );
        let names: Vec<&str> = low.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Budget", "Moderate", "Upscale", "Premium"]);

        let high = filter_and_sort(
            &source,
            &ListingQuery {
                sort: SortOrder::PriceHigh,
                ..Default::default()
            },
        );
        let names: Vec<&str> = high.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Premium", "Upscale", "Moderate", "Budget"]);
    }

    #[test]
    fn test_missing_price_sorts_as_budget() {
        let source = vec![
            listing("Moderate", ListingStatus::Active, Some(PriceLevel::Moderate)),
            listing("Unpriced", ListingStatus::Active, None),
        ];
        let sorted = filter_and_sort(
            &source,
            &ListingQuery {
                sort: SortOrder::PriceLow,
                ..Default::default()
            },
        );
        assert_eq!(sorted[0].name, "Unpriced");
    }

    #[test]
    fn test_text_filter_searches_amenities() {
        let mut shop = listing("Scoops", ListingStatus::Active, None);
        shop.amenities = vec!["Outdoor Seating".to_string(), "Vegan Options".to_string()];

        assert!(matches_text(&shop, "vegan"));
        assert!(matches_text(&shop, "seating vegan"));
        assert!(matches_text(&shop, ""));
        assert!(!matches_text(&shop, "drive-thru"));
    }

    #[test]
    fn test_price_filter_is_exact() {
        let source = vec![
            listing("A", ListingStatus::Active, Some(PriceLevel::Budget)),
            listing("B", ListingStatus::Active, Some(PriceLevel::Moderate)),
            listing("C", ListingStatus::Active, None),
        ];
        let result = filter_and_sort(
            &source,
            &ListingQuery {
                price: Some(PriceLevel::Moderate),
                ..Default::default()
            },
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "B");
    }

    #[test]
    fn test_map_markers_skip_missing_or_zero_coordinates() {
        let mut placed = listing("Placed", ListingStatus::Active, None);
        placed.latitude = Some(41.88);
        placed.longitude = Some(-87.63);
        let mut zero = listing("Zero", ListingStatus::Active, None);
        zero.latitude = Some(0.0);
        zero.longitude = Some(-87.63);
        let unplaced = listing("Unplaced", ListingStatus::Active, None);

        let markers = map_markers(&[placed.clone(), zero, unplaced], Some(placed.id));
        assert_eq!(markers.len(), 1);
        assert!(markers[0].selected);
        assert_eq!(markers[0].detail_path, format!("/shop/{}", placed.id));
    }

    #[test]
    fn test_default_viewport_is_chicago() {
        let viewport = MapViewport::default();
        assert_eq!(viewport.zoom, 11);
        assert!((viewport.center.latitude - 41.8781).abs() < 1e-9);
        assert!((viewport.center.longitude + 87.6298).abs() < 1e-9);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Tier order is $ < $$ < $$$ < $$$$, and price_high is its mirror
        #[test]
        fn prop_price_sort_follows_tiers(source in listings_strategy()) {
            let low = filter_and_sort(&source, &ListingQuery { sort: SortOrder::PriceLow, ..Default::default() });
            for pair in low.windows(2) {
                prop_assert!(PriceLevel::tier_of(pair[0].pricing) <= PriceLevel::tier_of(pair[1].pricing));
            }

            let high = filter_and_sort(&source, &ListingQuery { sort: SortOrder::PriceHigh, ..Default::default() });
            for pair in high.windows(2) {
                prop_assert!(PriceLevel::tier_of(pair[0].pricing) >= PriceLevel::tier_of(pair[1].pricing));
            }
        }

        /// Only active listings survive; with no filters all of them do
        #[test]
        fn prop_public_view_is_exactly_the_active_listings(source in listings_strategy()) {
            let view = filter_and_sort(&source, &ListingQuery::default());
            let active = source.iter().filter(|l| l.status == ListingStatus::Active).count();

            prop_assert_eq!(view.len(), active);
            prop_assert!(view.iter().all(|l| l.status == ListingStatus::Active));
            prop_assert_eq!(public_listings(&source).len(), active);
        }

        /// A listing passes the text filter iff the needle is a
        /// case-insensitive substring of one searchable field
        #[test]
        fn prop_text_filter_matches_searchable_fields(
            name in "[A-Za-z]{1,12}",
            description in "[A-Za-z ]{0,24}",
            amenity in "[A-Za-z]{1,10}",
            needle in "[A-Za-z]{1,4}",
        ) {
            let mut shop = listing(&name, ListingStatus::Active, None);
            shop.description = Some(description.clone());
            shop.amenities = vec![amenity.clone()];

            let lowered = needle.to_lowercase();
            let expected = [
                name.as_str(),
                "Chicago",
                "IL",
                "100 State St",
                description.as_str(),
                amenity.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&lowered));

            prop_assert_eq!(matches_text(&shop, &needle), expected);
            prop_assert_eq!(matches_text(&shop, &needle.to_uppercase()), expected);
        }
    }
}
