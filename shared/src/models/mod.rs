//! Domain models for the ice cream directory

mod contact;
mod coupon;
mod event;
mod import_log;
mod listing;
mod page;
mod profile;
mod review;
mod submission;

pub use contact::*;
pub use coupon::*;
pub use event::*;
pub use import_log::*;
pub use listing::*;
pub use page::*;
pub use profile::*;
pub use review::*;
pub use submission::*;
