// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout plan routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{NewWorkoutPlan, WorkoutDay, WorkoutPlan, WorkoutPlanPatch};
use crate::routes::input::{optional_text, required_text, validate, JsonBody};
use crate::routes::MessageResponse;
use crate::AppState;

const PLAN_NOT_FOUND: &str = "Workout plan not found";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workouts", get(list_plans).post(create_plan))
        .route(
            "/workouts/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanRequest {
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    name: Option<String>,
    #[validate(length(max = 31, message = "a plan can have at most 31 days"))]
    days: Option<Vec<WorkoutDay>>,
}

async fn list_plans(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WorkoutPlan>>> {
    Ok(Json(state.db.list_workout_plans(&user.user_id).await?))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutPlan>> {
    state
        .db
        .get_workout_plan(&user.user_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(PLAN_NOT_FOUND.to_string()))
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<WorkoutPlanRequest>,
) -> Result<(StatusCode, Json<WorkoutPlan>)> {
    validate(&body)?;

    let plan = NewWorkoutPlan {
        name: required_text(body.name, "Workout plan name")?,
        days: body.days.unwrap_or_default(),
    }
    .into_plan(&user.user_id, Utc::now());

    state.db.insert_workout_plan(&plan).await?;
    tracing::info!(
        owner_id = %user.user_id,
        plan_id = %plan.id,
        days = plan.days.len(),
        "Workout plan created"
    );

    Ok((StatusCode::CREATED, Json(plan)))
}

async fn update_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<WorkoutPlanRequest>,
) -> Result<Json<WorkoutPlan>> {
    validate(&body)?;

    let patch = WorkoutPlanPatch {
        name: optional_text(body.name, "Workout plan name")?,
        days: body.days,
    };

    let plan = state
        .db
        .update_workout_plan(&user.user_id, &id, patch, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(PLAN_NOT_FOUND.to_string()))?;

    tracing::info!(owner_id = %user.user_id, plan_id = %id, "Workout plan updated");
    Ok(Json(plan))
}

async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.db.delete_workout_plan(&user.user_id, &id).await? {
        return Err(AppError::NotFound(PLAN_NOT_FOUND.to_string()));
    }

    tracing::info!(owner_id = %user.user_id, plan_id = %id, "Workout plan deleted");
    Ok(MessageResponse::new("Workout plan deleted successfully"))
}
