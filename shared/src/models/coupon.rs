//! Coupon models and availability rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{Collection, Record};
use crate::types::PLATFORM_WIDE_SHOP_ID;

/// A discount offer, either for one listing or platform-wide
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub title: String,
    pub description: String,
    pub discount_percent: Option<i32>,
    pub discount_amount: Option<Decimal>,
    pub coupon_code: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
    pub terms_conditions: Option<String>,
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub current_usage: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Record for Coupon {
    const COLLECTION: Collection = Collection::Coupons;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Redeemability of a coupon at a point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CouponAvailability {
    Available,
    Expired,
    LimitReached,
    Inactive,
}

/// Which coupon actions the UI should enable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CouponActions {
    pub can_copy_code: bool,
    pub can_visit_shop: bool,
}

impl Coupon {
    pub fn is_platform_wide(&self) -> bool {
        self.shop_id == PLATFORM_WIDE_SHOP_ID
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }

    pub fn is_limit_reached(&self) -> bool {
        matches!(self.usage_limit, Some(limit) if self.current_usage >= limit)
    }

    /// Inactive wins over expired, which wins over an exhausted limit
    pub fn availability(&self, now: DateTime<Utc>) -> CouponAvailability {
        if !self.is_active {
            CouponAvailability::Inactive
        } else if self.is_expired(now) {
            CouponAvailability::Expired
        } else if self.is_limit_reached() {
            CouponAvailability::LimitReached
        } else {
            CouponAvailability::Available
        }
    }

    pub fn actions(&self, now: DateTime<Utc>) -> CouponActions {
        let available = self.availability(now) == CouponAvailability::Available;
        CouponActions {
            can_copy_code: available && self.coupon_code.is_some(),
            can_visit_shop: available && !self.is_platform_wide(),
        }
    }

    /// Badge text; a percentage takes precedence over a fixed amount
    pub fn discount_label(&self) -> String {
        if let Some(percent) = self.discount_percent {
            format!("{}% OFF", percent)
        } else if let Some(amount) = self.discount_amount {
            format!("${} OFF", amount.normalize())
        } else {
            "Special Offer".to_string()
        }
    }
}

/// Activation toggle payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CouponActivePatch {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(now: DateTime<Utc>) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            shop_id: Uuid::new_v4(),
            title: "Two scoops".to_string(),
            description: "Second scoop on us".to_string(),
            discount_percent: Some(20),
            discount_amount: None,
            coupon_code: Some("SCOOP20".to_string()),
            valid_from: None,
            valid_until: now + Duration::days(7),
            terms_conditions: None,
            usage_limit: None,
            current_usage: 0,
            is_active: true,
            image_url: None,
            gallery_images: vec![],
            seo_title: None,
            seo_description: None,
            seo_keywords: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_expired_coupon_disables_actions() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.valid_until = now - Duration::days(1);

        assert_eq!(c.availability(now), CouponAvailability::Expired);
        let actions = c.actions(now);
        assert!(!actions.can_copy_code);
        assert!(!actions.can_visit_shop);
        assert_eq!(c.discount_label(), "20% OFF");
    }

    #[test]
    fn test_limit_reached() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.usage_limit = Some(10);
        c.current_usage = 10;
        assert_eq!(c.availability(now), CouponAvailability::LimitReached);
    }

    #[test]
    fn test_platform_wide_coupon_has_no_shop_link() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.shop_id = PLATFORM_WIDE_SHOP_ID;
        let actions = c.actions(now);
        assert!(actions.can_copy_code);
        assert!(!actions.can_visit_shop);
    }

    #[test]
    fn test_discount_label_falls_back_to_amount() {
        let now = Utc::now();
        let mut c = coupon(now);
        c.discount_percent = None;
        c.discount_amount = Some(Decimal::new(250, 2));
        assert_eq!(c.discount_label(), "$2.5 OFF");
        c.discount_amount = None;
        assert_eq!(c.discount_label(), "Special Offer");
    }
}
