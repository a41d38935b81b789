// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in and session routes.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::UserProfile;
use crate::routes::input::{required_text, JsonBody};
use crate::AppState;

/// Sign-in routes (no session required). `/auth/google` is the path older
/// mobile builds call.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/google", post(login))
}

/// Routes that need a session; the auth layer is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(get_me))
}

/// Login request. The mobile client historically sent `idToken`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, alias = "idToken", alias = "identity_token")]
    identity_token: Option<String>,
}

/// Login response. The session token is sent twice: `token` is what the
/// mobile client stores, `session_token` is the documented name.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub session_token: String,
    pub user: UserProfile,
}

/// Exchange a Google ID token for a session token, creating the user on
/// first sign-in.
async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let id_token = required_text(body.identity_token, "identityToken")?;

    let session = state.identity.resolve(&id_token).await.map_err(|e| {
        tracing::warn!(error = %e, "Sign-in failed");
        e
    })?;

    tracing::info!(user_id = %session.user.id, "User signed in");

    Ok(Json(LoginResponse {
        session_token: session.token.clone(),
        token: session.token,
        user: UserProfile::from(&session.user),
    }))
}

/// Get the signed-in user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&profile)))
}
