//! WebAssembly module for the Ice Cream Directory
//!
//! Provides client-side computation for:
//! - Listing search, price filter and sort
//! - Price tiers
//! - Coupon availability
//! - Map markers
//! - Form validation

use chrono::{DateTime, NaiveTime, TimeZone, Utc, Weekday};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::listing_view::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn parse_listings(listings_json: &str) -> Result<Vec<Listing>, String> {
    serde_json::from_str(listings_json).map_err(|e| format!("Invalid listings JSON: {}", e))
}

fn to_js_error(message: String) -> JsValue {
    web_sys::console::error_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn js_now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(js_sys::Date::now() as i64)
        .single()
        .unwrap_or_else(Utc::now)
}

// ============================================================================
// Listings
// ============================================================================

/// Filter and sort a JSON array of listings with a JSON query
pub fn filter_listings_json(listings_json: &str, query_json: &str) -> Result<String, String> {
    let listings = parse_listings(listings_json)?;
    let query: ListingQuery =
        serde_json::from_str(query_json).map_err(|e| format!("Invalid query JSON: {}", e))?;
    serde_json::to_string(&filter_and_sort(&listings, &query)).map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn filter_listings(listings_json: &str, query_json: &str) -> Result<String, JsValue> {
    filter_listings_json(listings_json, query_json).map_err(to_js_error)
}

/// Sort tier for a price label; unknown or empty labels rank as budget
#[wasm_bindgen]
pub fn price_tier(pricing: &str) -> u8 {
    PriceLevel::tier_of(pricing.parse().ok())
}

pub fn map_markers_json(listings_json: &str, selected: Option<String>) -> Result<String, String> {
    let listings = parse_listings(listings_json)?;
    let selected = selected.and_then(|id| Uuid::parse_str(&id).ok());
    serde_json::to_string(&map_markers(&listings, selected)).map_err(|e| e.to_string())
}

/// Map markers for a JSON array of listings
#[wasm_bindgen]
pub fn listing_map_markers(listings_json: &str, selected: Option<String>) -> Result<String, JsValue> {
    map_markers_json(listings_json, selected).map_err(to_js_error)
}

/// Open/closed state of a listing's hours JSON on `weekday` ("monday".."sunday")
/// at `time` ("HH:MM")
pub fn open_status_json(hours_json: &str, weekday: &str, time: &str) -> Result<String, String> {
    let hours: OpeningHours =
        serde_json::from_str(hours_json).map_err(|e| format!("Invalid hours JSON: {}", e))?;
    let day: Weekday = weekday
        .parse()
        .map_err(|_| format!("Unknown weekday: {}", weekday))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| format!("Time must be HH:MM, got {}", time))?;
    serde_json::to_string(&hours.status_at(day, time)).map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn open_status(hours_json: &str, weekday: &str, time: &str) -> Result<String, JsValue> {
    open_status_json(hours_json, weekday, time).map_err(to_js_error)
}

// ============================================================================
// Coupons
// ============================================================================

pub fn coupon_state_json(coupon_json: &str, now: DateTime<Utc>) -> Result<String, String> {
    let coupon: Coupon =
        serde_json::from_str(coupon_json).map_err(|e| format!("Invalid coupon JSON: {}", e))?;
    let state = serde_json::json!({
        "availability": coupon.availability(now),
        "actions": coupon.actions(now),
        "discount_label": coupon.discount_label(),
    });
    Ok(state.to_string())
}

/// Availability, enabled actions and badge text for a coupon, as of the
/// browser clock
#[wasm_bindgen]
pub fn coupon_state(coupon_json: &str) -> Result<String, JsValue> {
    coupon_state_json(coupon_json, js_now()).map_err(to_js_error)
}

// ============================================================================
// Forms
// ============================================================================

#[wasm_bindgen]
pub fn is_valid_email(email: &str) -> bool {
    validate_email(email).is_ok()
}

#[wasm_bindgen]
pub fn is_valid_rating(rating: i32) -> bool {
    validate_rating(rating).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn listing(name: &str, pricing: Option<&str>, status: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "name": name,
            "address": "1 Main St",
            "city": "Chicago",
            "state": "IL",
            "pricing": pricing,
            "status": status,
            "latitude": 41.9,
            "longitude": -87.6,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        })
    }

    #[test]
    fn test_filter_listings_sorts_by_price() {
        let listings = json!([
            listing("Fancy", Some("$$$$"), "active"),
            listing("Cheap", Some("$"), "active"),
            listing("Hidden", Some("$$"), "pending"),
        ]);
        let out = filter_listings_json(&listings.to_string(), r#"{"sort":"price_high"}"#).unwrap();
        let names: Vec<String> = serde_json::from_str::<Vec<Value>>(&out)
            .unwrap()
            .iter()
            .map(|l| l["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Fancy", "Cheap"]);
    }

    #[test]
    fn test_filter_listings_rejects_bad_json() {
        let err = filter_listings_json("not json", "{}").unwrap_err();
        assert!(err.starts_with("Invalid listings JSON"));
    }

    #[test]
    fn test_price_tier() {
        assert_eq!(price_tier("$$$"), 3);
        assert_eq!(price_tier(""), 1);
        assert_eq!(price_tier("cheap"), 1);
    }

    #[test]
    fn test_markers_mark_selection() {
        let shop = listing("Scoops", None, "active");
        let id = shop["id"].as_str().unwrap().to_string();
        let out = map_markers_json(&json!([shop]).to_string(), Some(id)).unwrap();
        let markers: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0]["selected"], true);
    }

    #[test]
    fn test_expired_coupon_state() {
        let coupon = json!({
            "id": Uuid::new_v4(),
            "shop_id": Uuid::new_v4(),
            "title": "Double scoop",
            "description": "Second scoop free",
            "discount_percent": 20,
            "discount_amount": null,
            "coupon_code": "SCOOP20",
            "valid_from": null,
            "valid_until": "2024-06-01T00:00:00Z",
            "terms_conditions": null,
            "usage_limit": null,
            "image_url": null,
            "seo_title": null,
            "seo_description": null,
            "seo_keywords": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        });
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let out = coupon_state_json(&coupon.to_string(), now).unwrap();
        let state: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(state["availability"], "expired");
        assert_eq!(state["actions"]["can_copy_code"], false);
        assert_eq!(state["actions"]["can_visit_shop"], false);
        assert_eq!(state["discount_label"], "20% OFF");
    }

    #[test]
    fn test_open_status() {
        let hours = r#"{"friday":"18:00-01:00","sunday":"closed"}"#;
        assert_eq!(open_status_json(hours, "friday", "23:30").unwrap(), "\"open\"");
        assert_eq!(open_status_json(hours, "sunday", "12:00").unwrap(), "\"closed\"");
        assert_eq!(open_status_json(hours, "monday", "12:00").unwrap(), "\"unknown\"");
        assert!(open_status_json(hours, "someday", "12:00").is_err());
    }

    #[test]
    fn test_form_checks() {
        assert!(is_valid_email("dana@example.com"));
        assert!(!is_valid_email("dana"));
        assert!(is_valid_rating(5));
        assert!(!is_valid_rating(0));
    }
}
