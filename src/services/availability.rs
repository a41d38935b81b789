// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Availability creation, including the multi-date form where a trainer
//! picks several calendar days for the same session.

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{AvailabilitySlot, NewSlot};
use crate::time_utils::format_utc_rfc3339;

const MAX_CONCURRENT_DB_OPS: usize = 16;
/// Largest number of dates accepted in one bulk creation.
pub const MAX_BULK_DATES: usize = 62;

/// Session details shared by every slot of a multi-date submission.
#[derive(Debug, Clone)]
pub struct SlotTemplate {
    pub start_time: String,
    pub end_time: String,
    pub session_name: String,
    pub repeat_sessions: bool,
}

impl SlotTemplate {
    fn for_date(&self, date: DateTime<Utc>) -> NewSlot {
        NewSlot {
            date,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            session_name: self.session_name.clone(),
            repeat_sessions: self.repeat_sessions,
        }
    }
}

/// A date whose slot could not be stored.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
pub struct CreateFailure {
    pub date: String,
    pub message: String,
}

/// Outcome of a multi-date creation.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
pub struct BulkCreateReport {
    pub created: Vec<AvailabilitySlot>,
    pub failed: Vec<CreateFailure>,
}

#[derive(Clone)]
pub struct AvailabilityService {
    db: Database,
}

impl AvailabilityService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a single slot.
    pub async fn create(&self, owner_id: &str, new_slot: NewSlot) -> Result<AvailabilitySlot> {
        let slot = new_slot.into_slot(owner_id, Utc::now());
        self.db.insert_slot(&slot).await?;
        tracing::info!(owner_id, slot_id = %slot.id, date = %format_utc_rfc3339(slot.date), "Slot created");
        Ok(slot)
    }

    /// Create one independent slot per distinct date.
    ///
    /// Dates are expected to be validated already. Each write stands on its
    /// own; failures are reported per date and do not undo the others.
    pub async fn create_for_dates(
        &self,
        owner_id: &str,
        dates: &[DateTime<Utc>],
        template: &SlotTemplate,
    ) -> Result<BulkCreateReport> {
        let mut dates = dates.to_vec();
        dates.sort();
        dates.dedup();

        if dates.is_empty() {
            return Err(AppError::Validation(
                "Please select at least one date".to_string(),
            ));
        }
        if dates.len() > MAX_BULK_DATES {
            return Err(AppError::Validation(format!(
                "Cannot create slots for more than {} dates at once",
                MAX_BULK_DATES
            )));
        }

        let outcomes: Vec<(DateTime<Utc>, Result<AvailabilitySlot>)> = stream::iter(dates)
            .map(|date| async move { (date, self.create(owner_id, template.for_date(date)).await) })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect()
            .await;

        let mut report = BulkCreateReport {
            created: Vec::new(),
            failed: Vec::new(),
        };
        for (date, outcome) in outcomes {
            match outcome {
                Ok(slot) => report.created.push(slot),
                Err(e) => {
                    tracing::warn!(owner_id, error = %e, "Failed to create slot for date");
                    report.failed.push(CreateFailure {
                        date: format_utc_rfc3339(date),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            owner_id,
            created = report.created.len(),
            failed = report.failed.len(),
            "Bulk slot creation finished"
        );

        Ok(report)
    }
}
