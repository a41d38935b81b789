// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod client;
pub mod slot;
pub mod user;
pub mod workout;

pub use client::{Client, ClientPatch, NewClient};
pub use slot::{sort_slots, AvailabilitySlot, NewSlot, SlotPatch, SlotState};
pub use user::{User, UserProfile};
pub use workout::{Exercise, NewWorkoutPlan, WorkoutDay, WorkoutPlan, WorkoutPlanPatch};
