// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with the same contract as [`FirestoreDb`](super::FirestoreDb).
//!
//! Used for local development (`STORAGE_BACKEND=memory`) and tests. Each
//! collection is a `DashMap` keyed by document ID; single-document
//! read-modify-write happens under the shard lock held by `get_mut`, which
//! makes the booking check-and-set atomic.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::slot::sort_slots;
use crate::models::{
    AvailabilitySlot, Client, ClientPatch, SlotPatch, User, WorkoutPlan, WorkoutPlanPatch,
};

#[derive(Default)]
struct Collections {
    users: DashMap<String, User>,
    slots: DashMap<String, AvailabilitySlot>,
    clients: DashMap<String, Client>,
    workout_plans: DashMap<String, WorkoutPlan>,
}

/// In-memory database. Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    pub fn get_user(&self, user_id: &str) -> Option<User> {
        self.inner.users.get(user_id).map(|u| u.clone())
    }

    pub fn find_user_by_identity(&self, external_identity_id: &str) -> Option<User> {
        self.oldest_user_matching(|u| {
            u.external_identity_id.as_deref() == Some(external_identity_id)
        })
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.oldest_user_matching(|u| u.email == email)
    }

    fn oldest_user_matching(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        self.inner
            .users
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .min_by(|a, b| a.created_at.cmp(&b.created_at))
    }

    pub fn upsert_user(&self, user: &User) {
        self.inner.users.insert(user.id.clone(), user.clone());
    }

    // ─── Availability Operations ─────────────────────────────────

    pub fn list_slots(
        &self,
        owner_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Vec<AvailabilitySlot> {
        let mut slots: Vec<AvailabilitySlot> = self
            .inner
            .slots
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .filter(|entry| match range {
                Some((start, end)) => entry.date >= start && entry.date < end,
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();

        sort_slots(&mut slots);
        slots
    }

    pub fn get_slot(&self, owner_id: &str, slot_id: &str) -> Option<AvailabilitySlot> {
        self.inner
            .slots
            .get(slot_id)
            .filter(|s| s.owner_id == owner_id)
            .map(|s| s.clone())
    }

    pub fn insert_slot(&self, slot: &AvailabilitySlot) {
        self.inner.slots.insert(slot.id.clone(), slot.clone());
    }

    pub fn update_slot(
        &self,
        owner_id: &str,
        slot_id: &str,
        patch: SlotPatch,
    ) -> Option<AvailabilitySlot> {
        let mut slot = self.inner.slots.get_mut(slot_id)?;
        if slot.owner_id != owner_id {
            return None;
        }
        patch.apply(&mut slot);
        Some(slot.clone())
    }

    pub fn delete_slot(&self, owner_id: &str, slot_id: &str) -> bool {
        self.inner
            .slots
            .remove_if(slot_id, |_, slot| slot.owner_id == owner_id)
            .is_some()
    }

    pub fn book_slot(
        &self,
        slot_id: &str,
        booker_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AvailabilitySlot, AppError> {
        let mut slot = self
            .inner
            .slots
            .get_mut(slot_id)
            .ok_or_else(|| AppError::NotFound("Availability slot not found".to_string()))?;

        if !slot.mark_booked(booker_id, now) {
            return Err(AppError::AlreadyBooked);
        }
        Ok(slot.clone())
    }

    // ─── Client Operations ───────────────────────────────────────

    pub fn list_clients(&self, owner_id: &str) -> Vec<Client> {
        let mut clients: Vec<Client> = self
            .inner
            .clients
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        clients
    }

    pub fn get_client(&self, owner_id: &str, client_id: &str) -> Option<Client> {
        self.inner
            .clients
            .get(client_id)
            .filter(|c| c.owner_id == owner_id)
            .map(|c| c.clone())
    }

    pub fn insert_client(&self, client: &Client) {
        self.inner.clients.insert(client.id.clone(), client.clone());
    }

    pub fn update_client(
        &self,
        owner_id: &str,
        client_id: &str,
        patch: ClientPatch,
        now: DateTime<Utc>,
    ) -> Option<Client> {
        let mut client = self.inner.clients.get_mut(client_id)?;
        if client.owner_id != owner_id {
            return None;
        }
        patch.apply(&mut client, now);
        Some(client.clone())
    }

    pub fn delete_client(&self, owner_id: &str, client_id: &str) -> bool {
        self.inner
            .clients
            .remove_if(client_id, |_, client| client.owner_id == owner_id)
            .is_some()
    }

    // ─── Workout Plan Operations ─────────────────────────────────

    pub fn list_workout_plans(&self, owner_id: &str) -> Vec<WorkoutPlan> {
        let mut plans: Vec<WorkoutPlan> = self
            .inner
            .workout_plans
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        plans
    }

    pub fn get_workout_plan(&self, owner_id: &str, plan_id: &str) -> Option<WorkoutPlan> {
        self.inner
            .workout_plans
            .get(plan_id)
            .filter(|p| p.owner_id == owner_id)
            .map(|p| p.clone())
    }

    pub fn insert_workout_plan(&self, plan: &WorkoutPlan) {
        self.inner
            .workout_plans
            .insert(plan.id.clone(), plan.clone());
    }

    pub fn update_workout_plan(
        &self,
        owner_id: &str,
        plan_id: &str,
        patch: WorkoutPlanPatch,
        now: DateTime<Utc>,
    ) -> Option<WorkoutPlan> {
        let mut plan = self.inner.workout_plans.get_mut(plan_id)?;
        if plan.owner_id != owner_id {
            return None;
        }
        patch.apply(&mut plan, now);
        Some(plan.clone())
    }

    pub fn delete_workout_plan(&self, owner_id: &str, plan_id: &str) -> bool {
        self.inner
            .workout_plans
            .remove_if(plan_id, |_, plan| plan.owner_id == owner_id)
            .is_some()
    }
}
