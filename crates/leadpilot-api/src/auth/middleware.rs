use crate::auth::jwt::verify_token;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use leadpilot_core::AppError;
use leadpilot_services::ContextResolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub resolver: ContextResolver,
}

/// Authenticate the request and resolve the caller's organization context.
///
/// On success an [`OrgContext`](leadpilot_core::models::OrgContext) is placed
/// in the request extensions for handlers to extract. A first-time user gets
/// a workspace provisioned as a side effect of resolution.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) => token,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Invalid authorization header format".to_string(),
            ))
            .into_response();
        }
    };

    let claims = match verify_token(token, &auth_state.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let ctx = match auth_state.resolver.resolve(claims.sub, &claims.email).await {
        Ok(ctx) => ctx,
        Err(e) => return HttpAppError(e).into_response(),
    };

    request.extensions_mut().insert(ctx);
    next.run(request).await
}
