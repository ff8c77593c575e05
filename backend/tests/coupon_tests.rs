//! Coupon tests
//!
//! Tests for coupon display rules including:
//! - Expired coupons disable copy-code and visit-shop
//! - Public listing hides inactive and expired coupons

mod common;

use chrono::{Duration, Utc};
use serde_json::json;

use icecream_directory_backend::models::{Coupon, CouponAvailability, ListingStatus, PLATFORM_WIDE_SHOP_ID};
use icecream_directory_backend::services::CouponService;
use icecream_directory_backend::store::Gateway;
use uuid::Uuid;

use common::{seed_listing, test_state};

async fn seed_coupon(gateway: &Gateway, title: &str, shop_id: Uuid, days_valid: i64, active: bool) -> Coupon {
    let payload = json!({
        "shop_id": shop_id,
        "title": title,
        "description": "Limited time",
        "discount_percent": 20,
        "coupon_code": "SCOOP20",
        "valid_until": (Utc::now() + Duration::days(days_valid)).to_rfc3339(),
        "is_active": active,
    });
    gateway.create::<Coupon, _>(&payload).await.unwrap()
}

#[tokio::test]
async fn test_expired_coupon_actions_disabled() {
    let (state, _) = test_state();
    let service = CouponService::new(state.gateway.clone());
    let shop = seed_listing(&state.gateway, "Scoops", ListingStatus::Active).await;
    let coupon = seed_coupon(&state.gateway, "Yesterday", shop.id, -1, true).await;

    let view = service.detail(coupon.id).await.unwrap();

    assert_eq!(view.discount_label, "20% OFF");
    assert_eq!(view.availability, CouponAvailability::Expired);
    assert!(!view.actions.can_copy_code);
    assert!(!view.actions.can_visit_shop);
    assert_eq!(view.shop.map(|s| s.name), Some("Scoops".to_string()));
}

#[tokio::test]
async fn test_list_active_hides_expired_and_inactive() {
    let (state, _) = test_state();
    let service = CouponService::new(state.gateway.clone());
    let shop = seed_listing(&state.gateway, "Scoops", ListingStatus::Active).await;
    seed_coupon(&state.gateway, "Expired", shop.id, -1, true).await;
    seed_coupon(&state.gateway, "Paused", shop.id, 10, false).await;
    seed_coupon(&state.gateway, "Later", shop.id, 30, true).await;
    seed_coupon(&state.gateway, "Soon", PLATFORM_WIDE_SHOP_ID, 3, true).await;

    let coupons = service.list_active().await.unwrap();
    let titles: Vec<&str> = coupons.iter().map(|c| c.coupon.title.as_str()).collect();
    assert_eq!(titles, vec!["Soon", "Later"]);

    // platform-wide coupons have no shop to visit
    assert!(coupons[0].shop.is_none());
    assert!(coupons[0].actions.can_copy_code);
    assert!(!coupons[0].actions.can_visit_shop);
    assert!(coupons[1].actions.can_visit_shop);
}

#[tokio::test]
async fn test_toggle_flips_active_flag() {
    let (state, _) = test_state();
    let service = CouponService::new(state.gateway.clone());
    let coupon = seed_coupon(&state.gateway, "Toggle", PLATFORM_WIDE_SHOP_ID, 5, true).await;

    let off = service.toggle(coupon.id).await.unwrap();
    assert!(!off.is_active);
    let on = service.toggle(coupon.id).await.unwrap();
    assert!(on.is_active);

    let view = service.detail(coupon.id).await.unwrap();
    assert_eq!(view.availability, CouponAvailability::Available);
}

#[tokio::test]
async fn test_coupon_for_hidden_listing() {
    let (state, _) = test_state();
    let service = CouponService::new(state.gateway.clone());
    let pending = seed_listing(&state.gateway, "Not Yet", ListingStatus::Pending).await;
    let suspended = seed_listing(&state.gateway, "Paused Shop", ListingStatus::Suspended).await;
    let open = seed_listing(&state.gateway, "Scoops", ListingStatus::Active).await;
    let hidden = seed_coupon(&state.gateway, "Hidden", pending.id, 5, true).await;
    seed_coupon(&state.gateway, "Also Hidden", suspended.id, 6, true).await;
    seed_coupon(&state.gateway, "Shown", open.id, 7, true).await;

    let titles: Vec<String> = service
        .list_active()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.coupon.title)
        .collect();
    assert_eq!(titles, vec!["Shown"]);

    // detail still resolves, but never links to the non-public listing
    let view = service.detail(hidden.id).await.unwrap();
    assert!(view.shop.is_none());
    assert!(view.actions.can_copy_code);
    assert!(!view.actions.can_visit_shop);
}
