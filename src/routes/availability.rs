// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Availability slot routes: the trainer's own schedule plus booking.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AvailabilitySlot, NewSlot, SlotPatch};
use crate::routes::input::{optional_text, parse_date_field, required_text, JsonBody};
use crate::routes::MessageResponse;
use crate::services::{BookingReport, BulkCreateReport, SlotTemplate};
use crate::time_utils::{day_bounds, parse_calendar_day};
use crate::AppState;

const SLOT_NOT_FOUND: &str = "Availability slot not found";

/// Availability routes. The auth middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/availability", get(list_slots).post(create_slot))
        .route("/availability/bulk", post(create_slots_for_dates))
        .route("/availability/book", post(book_slots))
        .route(
            "/availability/{id}",
            get(get_slot).put(update_slot).delete(delete_slot),
        )
        .route("/availability/{id}/book", post(book_slot))
}

#[derive(Deserialize)]
pub struct ListSlotsQuery {
    /// Calendar day, `YYYY-MM-DD`.
    date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    session_name: Option<String>,
    repeat_sessions: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotsForDatesRequest {
    #[serde(default)]
    dates: Vec<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    session_name: Option<String>,
    repeat_sessions: Option<bool>,
}

/// Partial update. Booking fields are not accepted here.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotRequest {
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    session_name: Option<String>,
    repeat_sessions: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSlotsRequest {
    #[serde(default)]
    slot_ids: Vec<String>,
}

/// List the caller's slots in schedule order, optionally for one day.
async fn list_slots(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListSlotsQuery>,
) -> Result<Json<Vec<AvailabilitySlot>>> {
    let range = match query.date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let day = parse_calendar_day(raw).ok_or_else(|| {
                AppError::Validation("date must be a YYYY-MM-DD calendar day".to_string())
            })?;
            Some(day_bounds(day))
        }
    };

    let slots = state.db.list_slots(&user.user_id, range).await?;
    Ok(Json(slots))
}

async fn create_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CreateSlotRequest>,
) -> Result<(StatusCode, Json<AvailabilitySlot>)> {
    let raw_date = required_text(body.date, "date")?;
    let new_slot = NewSlot {
        date: parse_date_field(&raw_date, "date")?,
        start_time: required_text(body.start_time, "startTime")?,
        end_time: required_text(body.end_time, "endTime")?,
        session_name: required_text(body.session_name, "sessionName")?,
        repeat_sessions: body.repeat_sessions.unwrap_or(false),
    };

    let slot = state.availability.create(&user.user_id, new_slot).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// Create the same session on several days. Every field is checked before
/// anything is written.
async fn create_slots_for_dates(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CreateSlotsForDatesRequest>,
) -> Result<(StatusCode, Json<BulkCreateReport>)> {
    let template = SlotTemplate {
        start_time: required_text(body.start_time, "startTime")?,
        end_time: required_text(body.end_time, "endTime")?,
        session_name: required_text(body.session_name, "sessionName")?,
        repeat_sessions: body.repeat_sessions.unwrap_or(false),
    };
    let dates = body
        .dates
        .iter()
        .map(|raw| parse_date_field(raw.trim(), "dates"))
        .collect::<Result<Vec<_>>>()?;

    let report = state
        .availability
        .create_for_dates(&user.user_id, &dates, &template)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn get_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<AvailabilitySlot>> {
    state
        .db
        .get_slot(&user.user_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(SLOT_NOT_FOUND.to_string()))
}

async fn update_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateSlotRequest>,
) -> Result<Json<AvailabilitySlot>> {
    let date = optional_text(body.date, "date")?
        .map(|raw| parse_date_field(&raw, "date"))
        .transpose()?;
    let patch = SlotPatch {
        date,
        start_time: optional_text(body.start_time, "startTime")?,
        end_time: optional_text(body.end_time, "endTime")?,
        session_name: optional_text(body.session_name, "sessionName")?,
        repeat_sessions: body.repeat_sessions,
    };

    let slot = state
        .db
        .update_slot(&user.user_id, &id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(SLOT_NOT_FOUND.to_string()))?;

    tracing::info!(owner_id = %user.user_id, slot_id = %id, "Slot updated");
    Ok(Json(slot))
}

async fn delete_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.db.delete_slot(&user.user_id, &id).await? {
        return Err(AppError::NotFound(SLOT_NOT_FOUND.to_string()));
    }

    tracing::info!(owner_id = %user.user_id, slot_id = %id, "Slot deleted");
    Ok(MessageResponse::new("Availability slot deleted successfully"))
}

/// Book one slot for the caller. Any signed-in user may book any slot.
async fn book_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<AvailabilitySlot>> {
    let slot = state.booking.book(&id, &user.user_id).await?;
    Ok(Json(slot))
}

/// Book several slots; the report lists what was booked and why the rest
/// were not.
async fn book_slots(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<BookSlotsRequest>,
) -> Result<Json<BookingReport>> {
    let report = state.booking.book_many(&body.slot_ids, &user.user_id).await?;
    Ok(Json(report))
}
