//! Authentication middleware
//!
//! Bearer JWT verification followed by a profile lookup; the profile's role
//! drives access control in handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ErrorDetail, ErrorResponse};
use crate::models::UserRole;
use crate::services::RoleService;
use crate::AppState;

/// Authenticated user resolved from the token and their profile
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// Auth provider subject
    pub user_id: Uuid,
    pub email: Option<String>,
    pub profile_id: Uuid,
    pub role: UserRole,
    /// Listing assigned to a moderator
    pub shop_id: Option<Uuid>,
}

impl AuthUser {
    /// Check if the user's role grants at least `role`
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role.satisfies(role)
    }

    /// Permission guard for use in handlers
    pub fn require(&self, role: UserRole) -> Result<(), AppError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// JWT claims issued by the hosted auth provider
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

/// Decode and validate a token, returning the subject and email
pub fn decode_token(token: &str, secret: &str) -> Result<(Uuid, Option<String>), AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
    Ok((user_id, claims.email))
}

/// Authentication middleware that validates JWT tokens and loads the profile
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    let (user_id, email) = match decode_token(bearer.token(), &state.config.auth.jwt_secret) {
        Ok(subject) => subject,
        Err(e) => return unauthorized_response(&e.to_string()),
    };

    let profile = match RoleService::new(state.gateway.clone())
        .profile_for_user(user_id)
        .await
    {
        Ok(Some(profile)) => profile,
        Ok(None) => return unauthorized_response("No profile for this account"),
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        email,
        profile_id: profile.id,
        role: profile.role,
        shop_id: profile.shop_id,
    });

    next.run(request).await
}

fn unauthorized_body(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    let error = ErrorResponse {
        error: ErrorDetail::new("UNAUTHORIZED", message),
    };
    (StatusCode::UNAUTHORIZED, Json(error))
}

fn unauthorized_response(message: &str) -> Response {
    unauthorized_body(message).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers behind `auth_middleware`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| unauthorized_body("Authentication required"))
    }
}

/// Auth subject on public routes. A missing or invalid token yields `None`.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<Uuid>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state).await?;
        let user_id = bearer.and_then(|TypedHeader(Authorization(bearer))| {
            decode_token(bearer.token(), &state.config.auth.jwt_secret)
                .map(|(id, _)| id)
                .ok()
        });
        Ok(MaybeUser(user_id))
    }
}
