// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout plan model: a named plan made of ordered days of exercises.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::fixed_precision;

/// Stored workout plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    /// Plan ID (also used as document ID)
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub days: Vec<WorkoutDay>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    #[serde(with = "fixed_precision")]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    #[serde(with = "fixed_precision")]
    pub updated_at: DateTime<Utc>,
}

/// One day of a plan. `day_number` is whatever the client assigned; it is
/// not required to be contiguous or unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    pub day_number: u32,
    pub day_name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub notes: String,
}

/// An exercise entry. Sets and reps are free text so that ranges such as
/// "5-8" survive; plain JSON numbers are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "mobile/src/generated/")
)]
pub struct Exercise {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub sets: String,
    #[serde(deserialize_with = "string_or_number")]
    pub reps: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::Str(s) => s,
        Text::Int(n) => n.to_string(),
        Text::Float(n) => n.to_string(),
    })
}

/// Validated fields for a new plan.
#[derive(Debug, Clone)]
pub struct NewWorkoutPlan {
    pub name: String,
    pub days: Vec<WorkoutDay>,
}

impl NewWorkoutPlan {
    pub fn into_plan(self, owner_id: &str, now: DateTime<Utc>) -> WorkoutPlan {
        WorkoutPlan {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: self.name,
            days: self.days,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct WorkoutPlanPatch {
    pub name: Option<String>,
    pub days: Option<Vec<WorkoutDay>>,
}

impl WorkoutPlanPatch {
    pub fn apply(self, plan: &mut WorkoutPlan, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            plan.name = name;
        }
        if let Some(days) = self.days {
            plan.days = days;
        }
        plan.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_accepts_numbers_and_ranges() {
        let ex: Exercise =
            serde_json::from_str(r#"{"name":"Bench Press","sets":3,"reps":"5-8"}"#).unwrap();
        assert_eq!(ex.sets, "3");
        assert_eq!(ex.reps, "5-8");
    }

    #[test]
    fn test_day_notes_default_empty() {
        let day: WorkoutDay =
            serde_json::from_str(r#"{"dayNumber":1,"dayName":"Chest","exercises":[]}"#).unwrap();
        assert_eq!(day.notes, "");
        assert!(day.exercises.is_empty());
    }
}
