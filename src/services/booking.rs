// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Slot booking, single and bulk.
//!
//! Each booking is one conditional write in the store. A bulk request is a
//! set of independent bookings run concurrently: there is no rollback, and
//! the caller gets a per-slot outcome.

use chrono::Utc;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::AvailabilitySlot;

const MAX_CONCURRENT_BOOKINGS: usize = 16;
/// Largest number of distinct slots accepted in one bulk request.
pub const MAX_BULK_BOOKING: usize = 100;

/// A slot that could not be booked.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
pub struct BookingFailure {
    pub id: String,
    /// Machine-readable reason, e.g. `already_booked` or `not_found`
    pub reason: String,
    pub message: String,
}

/// Outcome of a bulk booking request.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct BookingReport {
    /// Distinct slot IDs attempted
    pub requested: usize,
    pub booked_count: usize,
    /// Booked slots, in request order
    pub booked: Vec<AvailabilitySlot>,
    /// Failed slots, in request order
    pub failed: Vec<BookingFailure>,
    /// Human-readable summary, e.g. "2 of 3 slots booked"
    pub summary: String,
}

impl BookingReport {
    fn from_outcomes(outcomes: Vec<(String, Result<AvailabilitySlot>)>) -> Self {
        let requested = outcomes.len();
        let mut booked = Vec::new();
        let mut failed = Vec::new();

        for (id, outcome) in outcomes {
            match outcome {
                Ok(slot) => booked.push(slot),
                Err(err) => failed.push(BookingFailure {
                    id,
                    reason: err.code().to_string(),
                    message: err.to_string(),
                }),
            }
        }

        let summary = if failed.is_empty() {
            format!("{} of {} slots booked", booked.len(), requested)
        } else {
            let ids: Vec<&str> = failed.iter().map(|f| f.id.as_str()).collect();
            format!(
                "{} of {} slots booked; failed: {}",
                booked.len(),
                requested,
                ids.join(", ")
            )
        };

        Self {
            requested,
            booked_count: booked.len(),
            booked,
            failed,
            summary,
        }
    }
}

/// Books slots on behalf of a signed-in user.
#[derive(Clone)]
pub struct BookingService {
    db: Database,
}

impl BookingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Book one slot. Fails with `NotFound` or `AlreadyBooked`.
    pub async fn book(&self, slot_id: &str, booker_id: &str) -> Result<AvailabilitySlot> {
        let slot = self.db.book_slot(slot_id, booker_id, Utc::now()).await?;
        tracing::info!(slot_id, booker_id, owner_id = %slot.owner_id, "Slot booked");
        Ok(slot)
    }

    /// Book every slot in `slot_ids` independently.
    ///
    /// Duplicate IDs are collapsed, keeping the first occurrence. Partial
    /// success is a normal outcome; only a malformed request is an error.
    pub async fn book_many(&self, slot_ids: &[String], booker_id: &str) -> Result<BookingReport> {
        let ids = distinct_ids(slot_ids);

        if ids.is_empty() {
            return Err(AppError::Validation(
                "Please select at least one slot to book".to_string(),
            ));
        }
        if ids.len() > MAX_BULK_BOOKING {
            return Err(AppError::Validation(format!(
                "Cannot book more than {} slots at once",
                MAX_BULK_BOOKING
            )));
        }

        let outcomes: Vec<(String, Result<AvailabilitySlot>)> = stream::iter(ids)
            .map(|id| async move {
                let outcome = self.book(&id, booker_id).await;
                if let Err(e) = &outcome {
                    tracing::info!(slot_id = %id, booker_id, reason = e.code(), "Slot booking failed");
                }
                (id, outcome)
            })
            .buffered(MAX_CONCURRENT_BOOKINGS)
            .collect()
            .await;

        let report = BookingReport::from_outcomes(outcomes);
        tracing::info!(
            booker_id,
            requested = report.requested,
            booked = report.booked_count,
            failed = report.failed.len(),
            "Bulk booking finished"
        );

        Ok(report)
    }
}

fn distinct_ids(slot_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    slot_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::models::NewSlot;
    use chrono::TimeZone;

    fn seed(db: &MemoryDb, n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                let slot = NewSlot {
                    date: Utc.with_ymd_and_hms(2026, 7, 1 + i as u32, 0, 0, 0).unwrap(),
                    start_time: "7:00 AM".to_string(),
                    end_time: "7:45 AM".to_string(),
                    session_name: "PT".to_string(),
                    repeat_sessions: false,
                }
                .into_slot("trainer-1", Utc::now());
                db.insert_slot(&slot);
                slot.id
            })
            .collect()
    }

    #[test]
    fn test_distinct_ids_keeps_first_occurrence() {
        let ids = vec![
            "b".to_string(),
            "a".to_string(),
            " b ".to_string(),
            "".to_string(),
            "c".to_string(),
        ];
        assert_eq!(distinct_ids(&ids), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_book_twice_conflicts() {
        let db = MemoryDb::new();
        let ids = seed(&db, 1);
        let service = BookingService::new(Database::Memory(db));

        let booked = service.book(&ids[0], "client-1").await.unwrap();
        assert!(booked.is_booked);
        assert_eq!(booked.booked_by.as_deref(), Some("client-1"));

        let again = service.book(&ids[0], "client-2").await;
        assert!(matches!(again, Err(AppError::AlreadyBooked)));
    }

    #[tokio::test]
    async fn test_bulk_partial_failure_is_not_rolled_back() {
        let db = MemoryDb::new();
        let ids = seed(&db, 3);
        let service = BookingService::new(Database::Memory(db.clone()));

        service.book(&ids[1], "someone-else").await.unwrap();

        let report = service.book_many(&ids, "client-1").await.unwrap();

        assert_eq!(report.requested, 3);
        assert_eq!(report.booked_count, 2);
        let booked_ids: Vec<&str> = report.booked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(booked_ids, vec![ids[0].as_str(), ids[2].as_str()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, ids[1]);
        assert_eq!(report.failed[0].reason, "already_booked");
        assert!(report.summary.starts_with("2 of 3 slots booked"));

        // The earlier booking by someone else stands.
        let b = db.get_slot("trainer-1", &ids[1]).unwrap();
        assert_eq!(b.booked_by.as_deref(), Some("someone-else"));
    }

    #[tokio::test]
    async fn test_bulk_reports_unknown_ids() {
        let db = MemoryDb::new();
        let ids = seed(&db, 1);
        let service = BookingService::new(Database::Memory(db));

        let report = service
            .book_many(&[ids[0].clone(), "missing".to_string()], "client-1")
            .await
            .unwrap();

        assert_eq!(report.booked_count, 1);
        assert_eq!(report.failed[0].reason, "not_found");
    }

    #[tokio::test]
    async fn test_bulk_rejects_empty_and_oversized() {
        let service = BookingService::new(Database::Memory(MemoryDb::new()));

        assert!(matches!(
            service.book_many(&[], "client-1").await,
            Err(AppError::Validation(_))
        ));

        let too_many: Vec<String> = (0..=MAX_BULK_BOOKING).map(|i| i.to_string()).collect();
        assert!(matches!(
            service.book_many(&too_many, "client-1").await,
            Err(AppError::Validation(_))
        ));
    }
}
