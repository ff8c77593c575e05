//! Coupon service

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Coupon, CouponActions, CouponActivePatch, CouponAvailability, Listing, ListingStatus,
    ListingSummary,
};
use crate::store::{Direction, Gateway, ListQuery};

/// Coupon service
#[derive(Clone)]
pub struct CouponService {
    gateway: Gateway,
}

/// Coupon card or detail payload
#[derive(Debug, Serialize)]
pub struct CouponView {
    #[serde(flatten)]
    pub coupon: Coupon,
    pub discount_label: String,
    pub availability: CouponAvailability,
    pub actions: CouponActions,
    /// Absent for platform-wide coupons
    pub shop: Option<ListingSummary>,
}

impl CouponView {
    /// `shop` must already be restricted to a publicly visible listing
    fn build(coupon: Coupon, shop: Option<&Listing>, now: DateTime<Utc>) -> Self {
        let mut actions = coupon.actions(now);
        actions.can_visit_shop &= shop.is_some();
        Self {
            discount_label: coupon.discount_label(),
            availability: coupon.availability(now),
            actions,
            shop: shop.map(ListingSummary::from),
            coupon,
        }
    }
}

impl CouponService {
    /// Create a new CouponService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Active coupons that have not expired, soonest expiry first. Coupons
    /// tied to a listing that is not public are left out.
    pub async fn list_active(&self) -> AppResult<Vec<CouponView>> {
        let now = Utc::now();
        let query = ListQuery::new()
            .eq("is_active", true)
            .gte("valid_until", now)
            .order_by("valid_until", Direction::Asc);
        let coupons = self.gateway.list::<Coupon>(&query).await?;

        let mut shop_ids: Vec<Uuid> = coupons
            .iter()
            .filter(|c| !c.is_platform_wide())
            .map(|c| c.shop_id)
            .collect();
        shop_ids.sort();
        shop_ids.dedup();
        let shops = if shop_ids.is_empty() {
            vec![]
        } else {
            let query = ListQuery::new()
                .any_of("id", shop_ids)
                .eq("status", ListingStatus::Active);
            self.gateway.list::<Listing>(&query).await?
        };

        Ok(coupons
            .into_iter()
            .filter_map(|coupon| {
                let shop = shops.iter().find(|s| s.id == coupon.shop_id);
                if shop.is_none() && !coupon.is_platform_wide() {
                    return None;
                }
                Some(CouponView::build(coupon, shop, now))
            })
            .collect())
    }

    /// Any coupon by id, with its computed availability
    pub async fn detail(&self, id: Uuid) -> AppResult<CouponView> {
        let coupon = self.gateway.fetch::<Coupon>(id).await?;
        let shop = if coupon.is_platform_wide() {
            None
        } else {
            self.gateway
                .get::<Listing>(coupon.shop_id)
                .await?
                .filter(|shop| shop.status.is_public())
        };
        Ok(CouponView::build(coupon, shop.as_ref(), Utc::now()))
    }

    /// Flip the active flag
    pub async fn toggle(&self, id: Uuid) -> AppResult<Coupon> {
        let coupon = self.gateway.fetch::<Coupon>(id).await?;
        let patch = CouponActivePatch {
            is_active: !coupon.is_active,
        };
        let coupon = self.gateway.update::<Coupon, _>(id, &patch).await?;
        tracing::info!(coupon_id = %id, is_active = coupon.is_active, "coupon toggled");
        Ok(coupon)
    }
}
