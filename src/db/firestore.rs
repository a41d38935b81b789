// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, identity lookups)
//! - Availability slots (owner-scoped CRUD plus the conditional booking write)
//! - Clients and workout plans (owner-scoped CRUD)
//!
//! Every read-modify-write of a single document runs inside a Firestore
//! transaction so that a concurrent booking can never be lost or undone.

use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreQueryDirection};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::db::collections;
use crate::error::AppError;
use crate::models::slot::sort_slots;
use crate::models::{
    AvailabilitySlot, Client, ClientPatch, SlotPatch, User, WorkoutPlan, WorkoutPlanPatch,
};
use crate::time_utils::format_utc_rfc3339;

/// Attempts for a read-modify-write transaction that keeps losing to
/// concurrent writers.
const MAX_TRANSACTION_ATTEMPTS: usize = 5;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Generic Helpers ─────────────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_doc<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Read one document, let `modify` mutate it, and write it back, all in a
    /// single transaction. The read registers the document for conflict
    /// detection, so a concurrent writer makes the commit fail rather than
    /// being silently overwritten.
    ///
    /// A commit that loses to a concurrent writer is retried from the read,
    /// so `modify` sees the winner's state (for a booking, that means
    /// `AlreadyBooked` rather than a storage error).
    ///
    /// Returns `Ok(None)` if the document does not exist. If `modify` returns
    /// an error the transaction is rolled back and nothing is written.
    async fn modify_in_transaction<T, R, F>(
        &self,
        collection: &str,
        id: &str,
        mut modify: F,
    ) -> Result<Option<R>, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnMut(&mut T) -> Result<R, AppError>,
    {
        let mut attempt = 1;
        loop {
            match self.try_modify_in_transaction(collection, id, &mut modify).await {
                Ok(result) => return Ok(result),
                Err(TransactionError::Failed(e)) => return Err(e),
                Err(TransactionError::Contended(e)) if attempt < MAX_TRANSACTION_ATTEMPTS => {
                    tracing::debug!(
                        collection,
                        id,
                        attempt,
                        error = %e,
                        "Transaction contended, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(25 * attempt as u64)).await;
                    attempt += 1;
                }
                Err(TransactionError::Contended(e)) => {
                    return Err(AppError::Database(format!(
                        "Transaction on {} still contended after {} attempts: {}",
                        collection, attempt, e
                    )));
                }
            }
        }
    }

    async fn try_modify_in_transaction<T, R, F>(
        &self,
        collection: &str,
        id: &str,
        modify: &mut F,
    ) -> Result<Option<R>, TransactionError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnMut(&mut T) -> Result<R, AppError>,
    {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| TransactionError::classify("Failed to begin transaction", e))?;

        let tx_reader = self
            .client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ));

        let read: Result<Option<T>, FirestoreError> = tx_reader
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await;

        let current = match read {
            Ok(current) => current,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(TransactionError::classify(
                    &format!("Failed to read {} in transaction", collection),
                    e,
                ));
            }
        };

        let Some(mut doc) = current else {
            let _ = transaction.rollback().await;
            return Ok(None);
        };

        let result = match modify(&mut doc) {
            Ok(result) => result,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(TransactionError::Failed(e));
            }
        };

        self.client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(&doc)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                TransactionError::Failed(AppError::Database(format!(
                    "Failed to add {} to transaction: {}",
                    collection, e
                )))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| TransactionError::classify("Transaction commit failed", e))?;

        Ok(Some(result))
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by internal ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, user_id).await
    }

    /// Find the user linked to an external identity (Google `sub`).
    pub async fn find_user_by_identity(
        &self,
        external_identity_id: &str,
    ) -> Result<Option<User>, AppError> {
        self.find_user_by_field("externalIdentityId", external_identity_id)
            .await
    }

    /// Find a user by email. Email is not unique; the oldest match wins.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_user_by_field("email", email).await
    }

    async fn find_user_by_field(&self, field: &str, value: &str) -> Result<Option<User>, AppError> {
        let field = field.to_string();
        let value = value.to_string();

        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field(field.as_str()).eq(value.clone()))
            .order_by([("createdAt", FirestoreQueryDirection::Ascending)])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.set_doc(collections::USERS, &user.id, user).await
    }

    // ─── Availability Operations ─────────────────────────────────

    /// List a trainer's slots in schedule order, optionally restricted to
    /// `[start, end)`.
    pub async fn list_slots(
        &self,
        owner_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AvailabilitySlot>, AppError> {
        let owner_id = owner_id.to_string();
        let bounds = range.map(|(start, end)| (format_utc_rfc3339(start), format_utc_rfc3339(end)));

        let mut slots: Vec<AvailabilitySlot> = self
            .client
            .fluent()
            .select()
            .from(collections::AVAILABILITY)
            .filter(move |q| {
                q.for_all([
                    q.field("ownerId").eq(owner_id.clone()),
                    bounds
                        .as_ref()
                        .and_then(|(start, _)| q.field("date").greater_than_or_equal(start.clone())),
                    bounds
                        .as_ref()
                        .and_then(|(_, end)| q.field("date").less_than(end.clone())),
                ])
            })
            .order_by([("date", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Firestore orders by date; start times are labels that need parsing.
        sort_slots(&mut slots);
        Ok(slots)
    }

    /// Get a slot owned by `owner_id`.
    pub async fn get_slot(
        &self,
        owner_id: &str,
        slot_id: &str,
    ) -> Result<Option<AvailabilitySlot>, AppError> {
        let slot: Option<AvailabilitySlot> =
            self.get_doc(collections::AVAILABILITY, slot_id).await?;
        Ok(slot.filter(|s| s.owner_id == owner_id))
    }

    /// Store a new slot.
    pub async fn insert_slot(&self, slot: &AvailabilitySlot) -> Result<(), AppError> {
        self.set_doc(collections::AVAILABILITY, &slot.id, slot).await
    }

    /// Apply a partial update to a slot owned by `owner_id`.
    pub async fn update_slot(
        &self,
        owner_id: &str,
        slot_id: &str,
        patch: SlotPatch,
    ) -> Result<Option<AvailabilitySlot>, AppError> {
        let owner_id = owner_id.to_string();
        let result = self
            .modify_in_transaction(
                collections::AVAILABILITY,
                slot_id,
                move |slot: &mut AvailabilitySlot| {
                    if slot.owner_id != owner_id {
                        return Err(AppError::NotFound("Availability slot not found".to_string()));
                    }
                    patch.clone().apply(slot);
                    Ok(slot.clone())
                },
            )
            .await;

        not_found_as_none(result)
    }

    /// Delete a slot owned by `owner_id`. Returns `false` if there was none.
    pub async fn delete_slot(&self, owner_id: &str, slot_id: &str) -> Result<bool, AppError> {
        if self.get_slot(owner_id, slot_id).await?.is_none() {
            return Ok(false);
        }
        self.delete_doc(collections::AVAILABILITY, slot_id).await?;
        Ok(true)
    }

    /// Conditionally book a slot: succeeds only if it is still open.
    ///
    /// Not owner-scoped; any signed-in user may book.
    pub async fn book_slot(
        &self,
        slot_id: &str,
        booker_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AvailabilitySlot, AppError> {
        let booker_id = booker_id.to_string();
        self.modify_in_transaction(
            collections::AVAILABILITY,
            slot_id,
            move |slot: &mut AvailabilitySlot| {
                if !slot.mark_booked(&booker_id, now) {
                    return Err(AppError::AlreadyBooked);
                }
                Ok(slot.clone())
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Availability slot not found".to_string()))
    }

    // ─── Client Operations ───────────────────────────────────────

    /// List a trainer's clients, newest first.
    pub async fn list_clients(&self, owner_id: &str) -> Result<Vec<Client>, AppError> {
        let owner_id = owner_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::CLIENTS)
            .filter(move |q| q.field("ownerId").eq(owner_id.clone()))
            .order_by([("createdAt", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_client(
        &self,
        owner_id: &str,
        client_id: &str,
    ) -> Result<Option<Client>, AppError> {
        let client: Option<Client> = self.get_doc(collections::CLIENTS, client_id).await?;
        Ok(client.filter(|c| c.owner_id == owner_id))
    }

    pub async fn insert_client(&self, client: &Client) -> Result<(), AppError> {
        self.set_doc(collections::CLIENTS, &client.id, client).await
    }

    pub async fn update_client(
        &self,
        owner_id: &str,
        client_id: &str,
        patch: ClientPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Client>, AppError> {
        let owner_id = owner_id.to_string();
        let result = self
            .modify_in_transaction(collections::CLIENTS, client_id, move |client: &mut Client| {
                if client.owner_id != owner_id {
                    return Err(AppError::NotFound("Client not found".to_string()));
                }
                patch.clone().apply(client, now);
                Ok(client.clone())
            })
            .await;

        not_found_as_none(result)
    }

    pub async fn delete_client(&self, owner_id: &str, client_id: &str) -> Result<bool, AppError> {
        if self.get_client(owner_id, client_id).await?.is_none() {
            return Ok(false);
        }
        self.delete_doc(collections::CLIENTS, client_id).await?;
        Ok(true)
    }

    // ─── Workout Plan Operations ─────────────────────────────────

    /// List a trainer's workout plans, newest first.
    pub async fn list_workout_plans(&self, owner_id: &str) -> Result<Vec<WorkoutPlan>, AppError> {
        let owner_id = owner_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::WORKOUT_PLANS)
            .filter(move |q| q.field("ownerId").eq(owner_id.clone()))
            .order_by([("createdAt", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_workout_plan(
        &self,
        owner_id: &str,
        plan_id: &str,
    ) -> Result<Option<WorkoutPlan>, AppError> {
        let plan: Option<WorkoutPlan> = self.get_doc(collections::WORKOUT_PLANS, plan_id).await?;
        Ok(plan.filter(|p| p.owner_id == owner_id))
    }

    pub async fn insert_workout_plan(&self, plan: &WorkoutPlan) -> Result<(), AppError> {
        self.set_doc(collections::WORKOUT_PLANS, &plan.id, plan).await
    }

    pub async fn update_workout_plan(
        &self,
        owner_id: &str,
        plan_id: &str,
        patch: WorkoutPlanPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkoutPlan>, AppError> {
        let owner_id = owner_id.to_string();
        let result = self
            .modify_in_transaction(
                collections::WORKOUT_PLANS,
                plan_id,
                move |plan: &mut WorkoutPlan| {
                    if plan.owner_id != owner_id {
                        return Err(AppError::NotFound("Workout plan not found".to_string()));
                    }
                    patch.clone().apply(plan, now);
                    Ok(plan.clone())
                },
            )
            .await;

        not_found_as_none(result)
    }

    pub async fn delete_workout_plan(
        &self,
        owner_id: &str,
        plan_id: &str,
    ) -> Result<bool, AppError> {
        if self.get_workout_plan(owner_id, plan_id).await?.is_none() {
            return Ok(false);
        }
        self.delete_doc(collections::WORKOUT_PLANS, plan_id).await?;
        Ok(true)
    }
}

/// Owner mismatches surface as `NotFound` from inside a transaction; callers
/// of the owner-scoped updates see them the same way as a missing document.
fn not_found_as_none<T>(result: Result<Option<T>, AppError>) -> Result<Option<T>, AppError> {
    match result {
        Err(AppError::NotFound(_)) => Ok(None),
        other => other,
    }
}

/// Outcome of one transaction attempt that did not produce a result.
enum TransactionError {
    /// Lost to a concurrent writer (or hit a transient backend error); the
    /// whole read-modify-write may be retried.
    Contended(FirestoreError),
    /// Anything else, including errors returned by the modify step.
    Failed(AppError),
}

impl TransactionError {
    fn classify(context: &str, e: FirestoreError) -> Self {
        match e {
            FirestoreError::DatabaseError(ref db_err) if db_err.retry_possible => {
                Self::Contended(e)
            }
            e => Self::Failed(AppError::Database(format!("{}: {}", context, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firestore::errors::{FirestoreDatabaseError, FirestoreErrorPublicGenericDetails};

    fn database_error(code: &str, retry_possible: bool) -> FirestoreError {
        FirestoreError::DatabaseError(FirestoreDatabaseError {
            public: FirestoreErrorPublicGenericDetails {
                code: code.to_string(),
            },
            details: format!("status: {code}"),
            retry_possible,
        })
    }

    #[test]
    fn test_aborted_commit_is_retried() {
        assert!(matches!(
            TransactionError::classify("commit", database_error("Aborted", true)),
            TransactionError::Contended(_)
        ));
    }

    #[test]
    fn test_permanent_error_is_not_retried() {
        match TransactionError::classify("commit", database_error("PermissionDenied", false)) {
            TransactionError::Failed(AppError::Database(msg)) => {
                assert!(msg.starts_with("commit: "), "{msg}");
            }
            _ => panic!("permanent errors must not be retried"),
        }
    }
}
