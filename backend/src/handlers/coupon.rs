//! Coupon handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Coupon, UserRole};
use crate::services::coupon::CouponView;
use crate::services::CouponService;
use crate::AppState;

/// Response for list of coupons
#[derive(Serialize)]
pub struct CouponsResponse {
    pub coupons: Vec<CouponView>,
}

/// Active, unexpired coupons
pub async fn list_coupons(State(state): State<AppState>) -> Result<Json<CouponsResponse>, AppError> {
    let service = CouponService::new(state.gateway.clone());
    let coupons = service.list_active().await?;

    Ok(Json(CouponsResponse { coupons }))
}

/// Coupon detail with availability and enabled actions
pub async fn get_coupon(
    State(state): State<AppState>,
    Path(coupon_id): Path<Uuid>,
) -> Result<Json<CouponView>, AppError> {
    let service = CouponService::new(state.gateway.clone());
    Ok(Json(service.detail(coupon_id).await?))
}

/// Flip a coupon's active flag
pub async fn toggle_coupon(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(coupon_id): Path<Uuid>,
) -> Result<Json<Coupon>, AppError> {
    user.require(UserRole::Admin)?;

    let service = CouponService::new(state.gateway.clone());
    Ok(Json(service.toggle(coupon_id).await?))
}
