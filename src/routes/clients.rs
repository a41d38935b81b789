// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client roster routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Client, ClientPatch, NewClient};
use crate::routes::input::{
    clearable_text, nullable, optional_text, parse_date_field, required_text, validate, JsonBody,
};
use crate::routes::MessageResponse;
use crate::AppState;

const CLIENT_NOT_FOUND: &str = "Client not found";

/// Client routes. The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

/// Create and update share one body; on create only `name` is required.
///
/// The optional fields tell a missing key (leave unchanged) apart from
/// `null` or blank (clear).
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(email(message = "email must be a valid email address"))]
    email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 40, message = "phone must be at most 40 characters"))]
    phone: Option<Option<String>>,
    #[validate(range(
        min = 0,
        max = 10000,
        message = "sessionsRemaining must be between 0 and 10000"
    ))]
    sessions_remaining: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    sessions_expiry_date: Option<Option<String>>,
}

impl ClientRequest {
    /// Blank optional fields count as cleared; everything else is checked.
    fn normalized(mut self) -> Result<Self> {
        self.email = clearable_text(self.email);
        self.phone = clearable_text(self.phone);
        self.sessions_expiry_date = clearable_text(self.sessions_expiry_date);
        validate(&self)?;
        Ok(self)
    }

    fn sessions_remaining(&self) -> Result<Option<u32>> {
        self.sessions_remaining
            .map(|n| {
                u32::try_from(n).map_err(|_| {
                    AppError::Validation("sessionsRemaining must not be negative".to_string())
                })
            })
            .transpose()
    }

    fn sessions_expiry_date(&self) -> Result<Option<Option<DateTime<Utc>>>> {
        self.sessions_expiry_date
            .as_ref()
            .map(|value| {
                value
                    .as_deref()
                    .map(|raw| parse_date_field(raw, "sessionsExpiryDate"))
                    .transpose()
            })
            .transpose()
    }
}

/// List the caller's clients, newest first.
async fn list_clients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Client>>> {
    Ok(Json(state.db.list_clients(&user.user_id).await?))
}

async fn get_client(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Client>> {
    state
        .db
        .get_client(&user.user_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(CLIENT_NOT_FOUND.to_string()))
}

async fn create_client(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<ClientRequest>,
) -> Result<(StatusCode, Json<Client>)> {
    let body = body.normalized()?;
    let sessions_remaining = body.sessions_remaining()?.unwrap_or(0);
    let sessions_expiry_date = body.sessions_expiry_date()?.flatten();

    let client = NewClient {
        name: required_text(body.name, "Client name")?,
        email: body.email.flatten(),
        phone: body.phone.flatten(),
        sessions_remaining,
        sessions_expiry_date,
    }
    .into_client(&user.user_id, Utc::now());

    state.db.insert_client(&client).await?;
    tracing::info!(owner_id = %user.user_id, client_id = %client.id, "Client created");

    Ok((StatusCode::CREATED, Json(client)))
}

async fn update_client(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ClientRequest>,
) -> Result<Json<Client>> {
    let body = body.normalized()?;
    let patch = ClientPatch {
        sessions_remaining: body.sessions_remaining()?,
        sessions_expiry_date: body.sessions_expiry_date()?,
        name: optional_text(body.name, "Client name")?,
        email: body.email,
        phone: body.phone,
    };

    let client = state
        .db
        .update_client(&user.user_id, &id, patch, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(CLIENT_NOT_FOUND.to_string()))?;

    tracing::info!(owner_id = %user.user_id, client_id = %id, "Client updated");
    Ok(Json(client))
}

async fn delete_client(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.db.delete_client(&user.user_id, &id).await? {
        return Err(AppError::NotFound(CLIENT_NOT_FOUND.to_string()));
    }

    tracing::info!(owner_id = %user.user_id, client_id = %id, "Client deleted");
    Ok(MessageResponse::new("Client deleted successfully"))
}
