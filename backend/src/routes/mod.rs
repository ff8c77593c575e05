//! Route definitions for the ice cream directory

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Public directory
        .nest("/listings", listing_routes(state.clone()))
        .nest("/events", event_routes())
        .nest("/coupons", coupon_routes())
        .route("/pages/:slug", get(handlers::get_page))
        .route("/contact", post(handlers::submit_contact))
        .route("/submissions", post(handlers::submit_shop))
        // Protected routes - signed-in users and shop owners
        .nest("/me", account_routes(state.clone()))
        // Protected routes - moderators
        .nest("/moderator", moderator_routes(state.clone()))
        // Protected routes - admin back office
        .nest("/admin", admin_routes(state))
}

/// Listing routes (public reads, review posting requires a user)
fn listing_routes(state: AppState) -> Router<AppState> {
    let create_review = post(handlers::create_review)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(handlers::list_listings))
        .route("/featured", get(handlers::list_featured_listings))
        .route("/map", get(handlers::get_listing_map))
        .route("/:listing_id", get(handlers::get_listing))
        .route(
            "/:listing_id/reviews",
            get(handlers::list_listing_reviews).merge(create_review),
        )
}

/// Event routes (public; registration links a signed-in user when present)
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_events))
        .route("/:event_id", get(handlers::get_event))
        .route("/:event_id/registrations", post(handlers::register_for_event))
}

/// Coupon routes (public)
fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_coupons))
        .route("/:coupon_id", get(handlers::get_coupon))
}

/// Signed-in user routes (protected)
fn account_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_my_dashboard))
        .route("/profile", put(handlers::update_my_profile))
        .route("/reviews/:review_id", delete(handlers::delete_my_review))
        .route(
            "/listing",
            get(handlers::get_my_listing).put(handlers::update_my_listing),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Moderator routes (protected)
fn moderator_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/listing",
            get(handlers::get_assigned_listing).put(handlers::update_assigned_listing),
        )
        .route("/reviews/:review_id", delete(handlers::delete_assigned_review))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin routes (protected)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::get_admin_stats))
        // Generic collection management
        .route(
            "/collections/:collection",
            get(handlers::list_collection).post(handlers::create_record),
        )
        .route(
            "/collections/:collection/:id",
            put(handlers::update_record).delete(handlers::delete_record),
        )
        .route("/listings/:listing_id/status", put(handlers::set_listing_status))
        .route("/coupons/:coupon_id/toggle", post(handlers::toggle_coupon))
        // Users, roles and moderator assignments
        .route("/profiles", get(handlers::list_profiles))
        .route("/profiles/:profile_id", put(handlers::update_profile))
        .route("/profiles/:profile_id/role", put(handlers::set_role))
        .route("/profiles/:profile_id/assignment", put(handlers::assign_listing))
        .route("/moderators", get(handlers::list_moderators))
        // Shop submissions
        .route("/submissions", get(handlers::list_submissions))
        .route("/submissions/:submission_id/approve", post(handlers::approve_submission))
        .route("/submissions/:submission_id/reject", post(handlers::reject_submission))
        // CSV import / export
        .route("/imports", get(handlers::list_imports))
        .route("/import/:kind", post(handlers::import_csv))
        .route("/import/:kind/template", get(handlers::get_import_template))
        .route("/export/:kind", get(handlers::export_csv))
        // Event registrations and marketing
        .route("/registrations", get(handlers::list_registrations))
        .route("/registrations/:registration_id", delete(handlers::delete_registration))
        .route("/events/:event_id/marketing", post(handlers::send_event_marketing))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
