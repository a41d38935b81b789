// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request body extraction and field validation shared by the handlers.

use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::time_utils::parse_date_input;

/// JSON body extractor whose rejections use the API error format.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Run `validator` checks, mapping failures to a 400.
pub fn validate<T: Validate>(input: &T) -> Result<()> {
    input
        .validate()
        .map_err(|errors| AppError::Validation(errors.to_string()))
}

/// A text field that must be present and not blank. Returns it trimmed.
pub fn required_text(value: Option<String>, field: &str) -> Result<String> {
    optional_text(value, field)?.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// A text field that may be absent, but must not be blank when present.
pub fn optional_text(value: Option<String>, field: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(AppError::Validation(format!("{field} is required")))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

/// A free-form optional field: blank is treated as absent.
fn optional_free_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A clearable field on an update: absent stays `None`, while blank or
/// `null` becomes `Some(None)`.
pub fn clearable_text(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(optional_free_text)
}

/// Deserialize a field so that an explicit `null` (`Some(None)`) is distinct
/// from a missing key (`None`). Use together with `#[serde(default)]`.
pub fn nullable<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse a `YYYY-MM-DD` or RFC3339 date field.
pub fn parse_date_field(raw: &str, field: &str) -> Result<DateTime<Utc>> {
    parse_date_input(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "{field} must be a YYYY-MM-DD date or an RFC3339 timestamp"
        ))
    })
}
