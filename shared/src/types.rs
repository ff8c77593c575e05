//! Common types used across the directory

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shop id stamped on coupons that are not tied to a single listing.
pub const PLATFORM_WIDE_SHOP_ID: Uuid = Uuid::nil();

/// Price tier shown as dollar signs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceLevel {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Upscale,
    #[serde(rename = "$$$$")]
    Premium,
}

impl PriceLevel {
    pub const ALL: [PriceLevel; 4] = [
        PriceLevel::Budget,
        PriceLevel::Moderate,
        PriceLevel::Upscale,
        PriceLevel::Premium,
    ];

    /// Numeric tier used for price sorting (1 = cheapest)
    pub fn tier(&self) -> u8 {
        match self {
            PriceLevel::Budget => 1,
            PriceLevel::Moderate => 2,
            PriceLevel::Upscale => 3,
            PriceLevel::Premium => 4,
        }
    }

    /// Tier for an optional price; listings without pricing sort as `$`
    pub fn tier_of(level: Option<PriceLevel>) -> u8 {
        level.map(|l| l.tier()).unwrap_or(1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLevel::Budget => "$",
            PriceLevel::Moderate => "$$",
            PriceLevel::Upscale => "$$$",
            PriceLevel::Premium => "$$$$",
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$" => Ok(PriceLevel::Budget),
            "$$" => Ok(PriceLevel::Moderate),
            "$$$" => Ok(PriceLevel::Upscale),
            "$$$$" => Ok(PriceLevel::Premium),
            _ => Err("price level must be one of $, $$, $$$, $$$$"),
        }
    }
}

/// Lifecycle status of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Pending,
    Active,
    Suspended,
    Closed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Active => "active",
            ListingStatus::Suspended => "suspended",
            ListingStatus::Closed => "closed",
        }
    }

    /// Only active listings are visible to the public
    pub fn is_public(&self) -> bool {
        matches!(self, ListingStatus::Active)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ListingStatus::Pending),
            "active" => Ok(ListingStatus::Active),
            "suspended" => Ok(ListingStatus::Suspended),
            "closed" => Ok(ListingStatus::Closed),
            _ => Err("status must be one of pending, active, suspended, closed"),
        }
    }
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point only when both coordinates are present and non-zero
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(Self::new(lat, lng)),
            _ => None,
        }
    }
}

// ============================================================================
// Opening Hours
// ============================================================================

/// Weekly opening hours keyed by lowercase weekday name.
///
/// Values are `"HH:MM-HH:MM"` ranges or `"closed"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct OpeningHours(pub BTreeMap<String, String>);

/// Whether a listing is open at a given moment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OpenStatus {
    Open,
    Closed,
    Unknown,
}

impl OpeningHours {
    pub fn day_key(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        }
    }

    /// Hours string for a weekday, if recorded
    pub fn for_day(&self, day: Weekday) -> Option<&str> {
        self.0.get(Self::day_key(day)).map(String::as_str)
    }

    /// Evaluate the open/closed state at `time` on `day`.
    ///
    /// A range whose close time is not after its open time wraps past midnight.
    pub fn status_at(&self, day: Weekday, time: NaiveTime) -> OpenStatus {
        let Some(raw) = self.for_day(day) else {
            return OpenStatus::Unknown;
        };
        if raw.trim().eq_ignore_ascii_case("closed") {
            return OpenStatus::Closed;
        }
        let Some((open, close)) = parse_range(raw) else {
            return OpenStatus::Unknown;
        };

        let is_open = if close > open {
            time >= open && time < close
        } else {
            time >= open || time < close
        };

        if is_open {
            OpenStatus::Open
        } else {
            OpenStatus::Closed
        }
    }
}

fn parse_range(raw: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (open, close) = raw.split_once('-')?;
    let open = NaiveTime::parse_from_str(open.trim(), "%H:%M").ok()?;
    let close = NaiveTime::parse_from_str(close.trim(), "%H:%M").ok()?;
    Some((open, close))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours() -> OpeningHours {
        let mut map = BTreeMap::new();
        map.insert("monday".to_string(), "12:00-22:00".to_string());
        map.insert("friday".to_string(), "18:00-01:00".to_string());
        map.insert("sunday".to_string(), "Closed".to_string());
        map.insert("tuesday".to_string(), "noon till late".to_string());
        OpeningHours(map)
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_price_tiers_are_ordered() {
        let tiers: Vec<u8> = PriceLevel::ALL.iter().map(|p| p.tier()).collect();
        assert_eq!(tiers, vec![1, 2, 3, 4]);
        assert_eq!(PriceLevel::tier_of(None), 1);
    }

    #[test]
    fn test_price_level_wire_format() {
        let json = serde_json::to_string(&PriceLevel::Upscale).unwrap();
        assert_eq!(json, "\"$$$\"");
        assert_eq!("$$".parse::<PriceLevel>(), Ok(PriceLevel::Moderate));
        assert!("$$$$$".parse::<PriceLevel>().is_err());
    }

    #[test]
    fn test_geo_point_requires_non_zero_coordinates() {
        assert!(GeoPoint::from_parts(Some(41.9), Some(-87.6)).is_some());
        assert!(GeoPoint::from_parts(Some(0.0), Some(-87.6)).is_none());
        assert!(GeoPoint::from_parts(None, Some(-87.6)).is_none());
    }

    #[test]
    fn test_opening_hours_status() {
        let hours = hours();
        assert_eq!(hours.status_at(Weekday::Mon, at(13, 0)), OpenStatus::Open);
        assert_eq!(hours.status_at(Weekday::Mon, at(22, 0)), OpenStatus::Closed);
        assert_eq!(hours.status_at(Weekday::Fri, at(0, 30)), OpenStatus::Open);
        assert_eq!(hours.status_at(Weekday::Fri, at(12, 0)), OpenStatus::Closed);
        assert_eq!(hours.status_at(Weekday::Sun, at(12, 0)), OpenStatus::Closed);
        assert_eq!(hours.status_at(Weekday::Tue, at(12, 0)), OpenStatus::Unknown);
        assert_eq!(hours.status_at(Weekday::Wed, at(12, 0)), OpenStatus::Unknown);
    }
}
