//! Business logic services for the ice cream directory

pub mod contact;
pub mod coupon;
pub mod dashboard;
pub mod event;
pub mod import_export;
pub mod listing;
pub mod notification;
pub mod page;
pub mod records;
pub mod review;
pub mod role;
pub mod submission;

pub use contact::ContactService;
pub use coupon::CouponService;
pub use dashboard::DashboardService;
pub use event::EventService;
pub use import_export::ImportExportService;
pub use listing::ListingService;
pub use notification::NotificationService;
pub use page::PageService;
pub use records::RecordService;
pub use review::ReviewService;
pub use role::RoleService;
pub use submission::SubmissionService;
