//! HTTP request handlers

mod account;
mod admin;
mod content;
mod coupon;
mod event;
mod health;
mod listing;
mod role;
mod submission;

pub use account::*;
pub use admin::*;
pub use content::*;
pub use coupon::*;
pub use event::*;
pub use health::*;
pub use listing::*;
pub use role::*;
pub use submission::*;
