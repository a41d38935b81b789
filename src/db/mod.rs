//! Database layer (Firestore, or in-memory for development and tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{
    AvailabilitySlot, Client, ClientPatch, SlotPatch, User, WorkoutPlan, WorkoutPlanPatch,
};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const AVAILABILITY: &str = "availability";
    pub const CLIENTS: &str = "clients";
    pub const WORKOUT_PLANS: &str = "workout_plans";
}

/// The configured store. Every operation except `book_slot` and the user
/// lookups is scoped to an owner ID; a record owned by someone else behaves
/// exactly like a missing one.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    // ─── Users ───────────────────────────────────────────────────

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.get_user(user_id).await,
            Database::Memory(db) => Ok(db.get_user(user_id)),
        }
    }

    pub async fn find_user_by_identity(
        &self,
        external_identity_id: &str,
    ) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.find_user_by_identity(external_identity_id).await,
            Database::Memory(db) => Ok(db.find_user_by_identity(external_identity_id)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.find_user_by_email(email).await,
            Database::Memory(db) => Ok(db.find_user_by_email(email)),
        }
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.upsert_user(user).await,
            Database::Memory(db) => {
                db.upsert_user(user);
                Ok(())
            }
        }
    }

    // ─── Availability ────────────────────────────────────────────

    pub async fn list_slots(
        &self,
        owner_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AvailabilitySlot>, AppError> {
        match self {
            Database::Firestore(db) => db.list_slots(owner_id, range).await,
            Database::Memory(db) => Ok(db.list_slots(owner_id, range)),
        }
    }

    pub async fn get_slot(
        &self,
        owner_id: &str,
        slot_id: &str,
    ) -> Result<Option<AvailabilitySlot>, AppError> {
        match self {
            Database::Firestore(db) => db.get_slot(owner_id, slot_id).await,
            Database::Memory(db) => Ok(db.get_slot(owner_id, slot_id)),
        }
    }

    pub async fn insert_slot(&self, slot: &AvailabilitySlot) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.insert_slot(slot).await,
            Database::Memory(db) => {
                db.insert_slot(slot);
                Ok(())
            }
        }
    }

    pub async fn update_slot(
        &self,
        owner_id: &str,
        slot_id: &str,
        patch: SlotPatch,
    ) -> Result<Option<AvailabilitySlot>, AppError> {
        match self {
            Database::Firestore(db) => db.update_slot(owner_id, slot_id, patch).await,
            Database::Memory(db) => Ok(db.update_slot(owner_id, slot_id, patch)),
        }
    }

    pub async fn delete_slot(&self, owner_id: &str, slot_id: &str) -> Result<bool, AppError> {
        match self {
            Database::Firestore(db) => db.delete_slot(owner_id, slot_id).await,
            Database::Memory(db) => Ok(db.delete_slot(owner_id, slot_id)),
        }
    }

    /// Atomic Open -> Booked transition. Fails with `NotFound` or `AlreadyBooked`.
    pub async fn book_slot(
        &self,
        slot_id: &str,
        booker_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AvailabilitySlot, AppError> {
        match self {
            Database::Firestore(db) => db.book_slot(slot_id, booker_id, now).await,
            Database::Memory(db) => db.book_slot(slot_id, booker_id, now),
        }
    }

    // ─── Clients ─────────────────────────────────────────────────

    pub async fn list_clients(&self, owner_id: &str) -> Result<Vec<Client>, AppError> {
        match self {
            Database::Firestore(db) => db.list_clients(owner_id).await,
            Database::Memory(db) => Ok(db.list_clients(owner_id)),
        }
    }

    pub async fn get_client(
        &self,
        owner_id: &str,
        client_id: &str,
    ) -> Result<Option<Client>, AppError> {
        match self {
            Database::Firestore(db) => db.get_client(owner_id, client_id).await,
            Database::Memory(db) => Ok(db.get_client(owner_id, client_id)),
        }
    }

    pub async fn insert_client(&self, client: &Client) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.insert_client(client).await,
            Database::Memory(db) => {
                db.insert_client(client);
                Ok(())
            }
        }
    }

    pub async fn update_client(
        &self,
        owner_id: &str,
        client_id: &str,
        patch: ClientPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Client>, AppError> {
        match self {
            Database::Firestore(db) => db.update_client(owner_id, client_id, patch, now).await,
            Database::Memory(db) => Ok(db.update_client(owner_id, client_id, patch, now)),
        }
    }

    pub async fn delete_client(&self, owner_id: &str, client_id: &str) -> Result<bool, AppError> {
        match self {
            Database::Firestore(db) => db.delete_client(owner_id, client_id).await,
            Database::Memory(db) => Ok(db.delete_client(owner_id, client_id)),
        }
    }

    // ─── Workout Plans ───────────────────────────────────────────

    pub async fn list_workout_plans(&self, owner_id: &str) -> Result<Vec<WorkoutPlan>, AppError> {
        match self {
            Database::Firestore(db) => db.list_workout_plans(owner_id).await,
            Database::Memory(db) => Ok(db.list_workout_plans(owner_id)),
        }
    }

    pub async fn get_workout_plan(
        &self,
        owner_id: &str,
        plan_id: &str,
    ) -> Result<Option<WorkoutPlan>, AppError> {
        match self {
            Database::Firestore(db) => db.get_workout_plan(owner_id, plan_id).await,
            Database::Memory(db) => Ok(db.get_workout_plan(owner_id, plan_id)),
        }
    }

    pub async fn insert_workout_plan(&self, plan: &WorkoutPlan) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.insert_workout_plan(plan).await,
            Database::Memory(db) => {
                db.insert_workout_plan(plan);
                Ok(())
            }
        }
    }

    pub async fn update_workout_plan(
        &self,
        owner_id: &str,
        plan_id: &str,
        patch: WorkoutPlanPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkoutPlan>, AppError> {
        match self {
            Database::Firestore(db) => db.update_workout_plan(owner_id, plan_id, patch, now).await,
            Database::Memory(db) => Ok(db.update_workout_plan(owner_id, plan_id, patch, now)),
        }
    }

    pub async fn delete_workout_plan(
        &self,
        owner_id: &str,
        plan_id: &str,
    ) -> Result<bool, AppError> {
        match self {
            Database::Firestore(db) => db.delete_workout_plan(owner_id, plan_id).await,
            Database::Memory(db) => Ok(db.delete_workout_plan(owner_id, plan_id)),
        }
    }
}
