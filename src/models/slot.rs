// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Availability slot model.
//!
//! A slot is a bookable interval a trainer offers on one calendar day. It is
//! created open and moves to booked exactly once; the only way out of the
//! booked state is deleting the slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::{fixed_precision, parse_time_of_day};

/// Stored availability slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    /// Slot ID (also used as document ID)
    pub id: String,
    /// Trainer who offers the slot
    pub owner_id: String,
    /// Calendar day, stored as UTC with whole-second precision
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: DateTime<Utc>,
    /// Start time label, e.g. "11:00 AM"
    pub start_time: String,
    /// End time label
    pub end_time: String,
    /// Session label, e.g. "PT"
    pub session_name: String,
    /// Whether the trainer marked the session as repeating
    #[serde(default)]
    pub repeat_sessions: bool,
    #[serde(default)]
    pub is_booked: bool,
    /// Set exactly when `is_booked` is true
    #[serde(default)]
    pub booked_by: Option<String>,
    #[serde(default, with = "fixed_precision::option")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub booked_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    #[serde(with = "fixed_precision")]
    pub created_at: DateTime<Utc>,
}

/// Booking state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Open,
    Booked,
}

impl AvailabilitySlot {
    pub fn state(&self) -> SlotState {
        if self.is_booked {
            SlotState::Booked
        } else {
            SlotState::Open
        }
    }

    /// Transition Open -> Booked. Returns `false` (and leaves the slot
    /// untouched) if it was already booked.
    ///
    /// Stores must apply this under the same lock or transaction as the read
    /// that produced `self`.
    pub fn mark_booked(&mut self, booker_id: &str, now: DateTime<Utc>) -> bool {
        if self.is_booked {
            return false;
        }
        self.is_booked = true;
        self.booked_by = Some(booker_id.to_string());
        self.booked_at = Some(now);
        true
    }

    /// Ordering used by every slot listing: by date, then by start time.
    pub fn schedule_cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| compare_time_labels(&self.start_time, &other.start_time))
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

/// Compare two time labels chronologically when both parse, textually otherwise.
fn compare_time_labels(a: &str, b: &str) -> Ordering {
    match (parse_time_of_day(a), parse_time_of_day(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sort slots into schedule order.
pub fn sort_slots(slots: &mut [AvailabilitySlot]) {
    slots.sort_by(AvailabilitySlot::schedule_cmp);
}

/// Fields needed to create a slot, already validated.
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
    pub session_name: String,
    pub repeat_sessions: bool,
}

impl NewSlot {
    pub fn into_slot(self, owner_id: &str, now: DateTime<Utc>) -> AvailabilitySlot {
        AvailabilitySlot {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            session_name: self.session_name,
            repeat_sessions: self.repeat_sessions,
            is_booked: false,
            booked_by: None,
            booked_at: None,
            created_at: now,
        }
    }
}

/// Partial update of the trainer-editable fields. Booking state is not
/// editable here.
#[derive(Debug, Clone, Default)]
pub struct SlotPatch {
    pub date: Option<DateTime<Utc>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub session_name: Option<String>,
    pub repeat_sessions: Option<bool>,
}

impl SlotPatch {
    pub fn apply(self, slot: &mut AvailabilitySlot) {
        if let Some(date) = self.date {
            slot.date = date;
        }
        if let Some(start_time) = self.start_time {
            slot.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            slot.end_time = end_time;
        }
        if let Some(session_name) = self.session_name {
            slot.session_name = session_name;
        }
        if let Some(repeat_sessions) = self.repeat_sessions {
            slot.repeat_sessions = repeat_sessions;
        }
    }
}
