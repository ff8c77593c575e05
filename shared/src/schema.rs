//! Collection catalogue for the record store
//!
//! Every persisted entity lives in one named collection (a table in the
//! hosted store). Column lists here are the single source of truth for which
//! keys a row may carry; the backend store rejects anything else before it
//! reaches SQL.

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

/// Named collections in the record store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Shops,
    Events,
    EventRegistrations,
    Coupons,
    Reviews,
    Profiles,
    Pages,
    ShopSubmissions,
    ContactInquiries,
    ImportLogs,
}

const SEO: [&str; 3] = ["seo_title", "seo_description", "seo_keywords"];

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::Shops,
        Collection::Events,
        Collection::EventRegistrations,
        Collection::Coupons,
        Collection::Reviews,
        Collection::Profiles,
        Collection::Pages,
        Collection::ShopSubmissions,
        Collection::ContactInquiries,
        Collection::ImportLogs,
    ];

    /// Slug used in admin URLs
    pub fn slug(&self) -> &'static str {
        match self {
            Collection::Shops => "shops",
            Collection::Events => "events",
            Collection::EventRegistrations => "event_registrations",
            Collection::Coupons => "coupons",
            Collection::Reviews => "reviews",
            Collection::Profiles => "profiles",
            Collection::Pages => "pages",
            Collection::ShopSubmissions => "shop_submissions",
            Collection::ContactInquiries => "contact_inquiries",
            Collection::ImportLogs => "import_logs",
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Shops => "ice_cream_shops",
            other => other.slug(),
        }
    }

    /// Human label used in not-found messages
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Shops => "Listing",
            Collection::Events => "Event",
            Collection::EventRegistrations => "Registration",
            Collection::Coupons => "Coupon",
            Collection::Reviews => "Review",
            Collection::Profiles => "Profile",
            Collection::Pages => "Page",
            Collection::ShopSubmissions => "Submission",
            Collection::ContactInquiries => "Inquiry",
            Collection::ImportLogs => "Import log",
        }
    }

    /// Whether rows carry an `updated_at` column
    pub fn has_updated_at(&self) -> bool {
        !matches!(self, Collection::ContactInquiries | Collection::ImportLogs)
    }

    /// Columns other than `id`, `created_at` and `updated_at`
    pub fn data_columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = match self {
            Collection::Shops => vec![
                "name",
                "address",
                "city",
                "state",
                "zip_code",
                "phone",
                "website_url",
                "facebook_url",
                "instagram_url",
                "twitter_url",
                "description",
                "pricing",
                "status",
                "latitude",
                "longitude",
                "hours",
                "amenities",
                "image_url",
                "gallery_images",
                "featured",
                "owner_name",
                "owner_email",
                "owner_profile_id",
            ],
            Collection::Events => vec![
                "title",
                "description",
                "event_date",
                "end_date",
                "location",
                "latitude",
                "longitude",
                "shop_id",
                "is_featured",
                "image_url",
                "gallery_images",
                "registration_url",
            ],
            Collection::EventRegistrations => vec!["event_id", "name", "email", "user_id"],
            Collection::Coupons => vec![
                "shop_id",
                "title",
                "description",
                "discount_percent",
                "discount_amount",
                "coupon_code",
                "valid_from",
                "valid_until",
                "terms_conditions",
                "usage_limit",
                "current_usage",
                "is_active",
                "image_url",
                "gallery_images",
            ],
            Collection::Reviews => vec![
                "shop_id",
                "user_id",
                "rating",
                "title",
                "content",
                "status",
                "helpful_count",
            ],
            Collection::Profiles => vec![
                "user_id",
                "display_name",
                "bio",
                "avatar_url",
                "role",
                "shop_id",
            ],
            Collection::Pages => vec![
                "slug",
                "title",
                "content",
                "page_type",
                "is_published",
                "meta_description",
                "meta_keywords",
                "og_title",
                "og_description",
                "og_image",
                "created_by",
            ],
            Collection::ShopSubmissions => vec![
                "business_name",
                "contact_name",
                "contact_email",
                "contact_phone",
                "address",
                "city",
                "state",
                "zip_code",
                "website_url",
                "description",
                "notes",
                "status",
            ],
            Collection::ContactInquiries => vec!["name", "email", "subject", "message", "status"],
            Collection::ImportLogs => vec![
                "import_type",
                "filename",
                "total_records",
                "successful_records",
                "failed_records",
                "errors",
                "created_by",
            ],
        };

        if matches!(
            self,
            Collection::Shops | Collection::Events | Collection::Coupons
        ) {
            columns.extend(SEO);
        }
        columns
    }

    /// Every column, including bookkeeping columns
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["id", "created_at"];
        if self.has_updated_at() {
            columns.push("updated_at");
        }
        columns.extend(self.data_columns());
        columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        column == "id"
            || column == "created_at"
            || (column == "updated_at" && self.has_updated_at())
            || self.data_columns().contains(&column)
    }

    /// NOT NULL columns without a default; inserts must supply them
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Shops => &["name", "address"],
            Collection::Events => &["title", "event_date"],
            Collection::EventRegistrations => &["event_id", "name", "email"],
            Collection::Coupons => &["shop_id", "title", "description", "valid_until"],
            Collection::Reviews => &["shop_id", "user_id", "rating", "content"],
            Collection::Profiles => &["user_id"],
            Collection::Pages => &["slug", "title"],
            Collection::ShopSubmissions => &[
                "business_name",
                "contact_name",
                "contact_email",
                "address",
                "city",
                "state",
            ],
            Collection::ContactInquiries => &["name", "email", "message"],
            Collection::ImportLogs => &["import_type"],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.slug() == s || c.table() == s)
            .ok_or_else(|| format!("unknown collection '{}'", s))
    }
}

/// A typed row bound to its collection
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
}
