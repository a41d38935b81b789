// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution: Google ID token -> internal user -> session token.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::User;
use crate::services::google_oidc::{GoogleIdTokenVerifier, VerifiedIdentity};

/// A signed-in user with a fresh session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Maps external identities to internal users and issues session tokens.
pub struct IdentityResolver {
    verifier: Arc<GoogleIdTokenVerifier>,
    db: Database,
    signing_key: Vec<u8>,
    session_ttl_days: i64,
}

impl IdentityResolver {
    pub fn new(
        verifier: Arc<GoogleIdTokenVerifier>,
        db: Database,
        signing_key: Vec<u8>,
        session_ttl_days: i64,
    ) -> Self {
        Self {
            verifier,
            db,
            signing_key,
            session_ttl_days,
        }
    }

    /// Verify an ID token, find or create the matching user and issue a
    /// session token for it.
    pub async fn resolve(&self, id_token: &str) -> Result<Session> {
        let identity = self.verifier.verify(id_token).await?;
        let user = self.find_or_create_user(&identity, Utc::now()).await?;

        let token = create_jwt(&user.id, &self.signing_key, self.session_ttl_days)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

        Ok(Session { token, user })
    }

    /// Resolve a verified identity to a user, writing the user record exactly
    /// once.
    ///
    /// Lookup order: by external identity, then by email for accounts that
    /// predate Google sign-in (which get linked), else a new user.
    pub async fn find_or_create_user(
        &self,
        identity: &VerifiedIdentity,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let user = if let Some(mut user) = self.db.find_user_by_identity(&identity.subject).await? {
            refresh_profile(&mut user, identity);
            user.last_login_at = now;
            tracing::debug!(user_id = %user.id, "Returning user signed in");
            user
        } else if let Some(mut user) = self.linkable_user_by_email(&identity.email).await? {
            user.external_identity_id = Some(identity.subject.clone());
            refresh_profile(&mut user, identity);
            user.last_login_at = now;
            tracing::info!(user_id = %user.id, "Linked Google identity to existing account");
            user
        } else {
            let user = User {
                id: uuid::Uuid::new_v4().to_string(),
                external_identity_id: Some(identity.subject.clone()),
                email: identity.email.clone(),
                display_name: identity.name.clone(),
                avatar_url: identity.picture.clone(),
                created_at: now,
                last_login_at: now,
            };
            tracing::info!(user_id = %user.id, "Created new user");
            user
        };

        self.db.upsert_user(&user).await?;
        Ok(user)
    }

    /// An email match is only linked if it has no external identity yet;
    /// an account already bound to a different Google account is left alone.
    async fn linkable_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self.db.find_user_by_email(email).await?;
        Ok(user.filter(|u| u.external_identity_id.is_none()))
    }
}

fn refresh_profile(user: &mut User, identity: &VerifiedIdentity) {
    if user.display_name != identity.name {
        user.display_name = identity.name.clone();
    }
    if let Some(picture) = &identity.picture {
        if user.avatar_url.as_ref() != Some(picture) {
            user.avatar_url = Some(picture.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryDb;
    use jsonwebtoken::DecodingKey;

    fn resolver(db: &MemoryDb) -> IdentityResolver {
        let config = Config::test_default();
        let verifier = GoogleIdTokenVerifier::new_with_static_key(
            &config,
            "unused",
            DecodingKey::from_secret(b"unused"),
        )
        .unwrap();
        IdentityResolver::new(
            Arc::new(verifier),
            Database::Memory(db.clone()),
            config.jwt_signing_key,
            config.session_ttl_days,
        )
    }

    fn identity(subject: &str, email: &str, name: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            subject: subject.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            picture: Some("https://example.com/a.png".to_string()),
        }
    }

    #[tokio::test]
    async fn test_same_identity_same_user() {
        let db = MemoryDb::new();
        let resolver = resolver(&db);

        let first = resolver
            .find_or_create_user(&identity("g-1", "ann@example.com", "Ann"), Utc::now())
            .await
            .unwrap();
        let second = resolver
            .find_or_create_user(&identity("g-1", "ann@example.com", "Ann B."), Utc::now())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name, "Ann B.");
        assert_eq!(db.get_user(&first.id).unwrap().display_name, "Ann B.");
    }

    #[tokio::test]
    async fn test_links_pre_federation_account_by_email() {
        let db = MemoryDb::new();
        let legacy = User {
            id: "legacy-1".to_string(),
            external_identity_id: None,
            email: "bob@example.com".to_string(),
            display_name: "Bob".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
            last_login_at: Utc::now(),
        };
        db.upsert_user(&legacy);

        let user = resolver(&db)
            .find_or_create_user(&identity("g-2", "bob@example.com", "Bob"), Utc::now())
            .await
            .unwrap();

        assert_eq!(user.id, "legacy-1");
        assert_eq!(user.external_identity_id.as_deref(), Some("g-2"));
        assert_eq!(user.avatar_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(db.find_user_by_identity("g-2").unwrap().id, "legacy-1");
    }

    #[tokio::test]
    async fn test_email_bound_to_other_identity_not_hijacked() {
        let db = MemoryDb::new();
        let resolver = resolver(&db);

        let original = resolver
            .find_or_create_user(&identity("g-3", "cat@example.com", "Cat"), Utc::now())
            .await
            .unwrap();
        let other = resolver
            .find_or_create_user(&identity("g-4", "cat@example.com", "Cat"), Utc::now())
            .await
            .unwrap();

        assert_ne!(original.id, other.id);
        assert_eq!(
            db.get_user(&original.id).unwrap().external_identity_id.as_deref(),
            Some("g-3")
        );
    }

    #[tokio::test]
    async fn test_missing_picture_keeps_existing_avatar() {
        let db = MemoryDb::new();
        let resolver = resolver(&db);

        resolver
            .find_or_create_user(&identity("g-5", "dee@example.com", "Dee"), Utc::now())
            .await
            .unwrap();

        let mut no_picture = identity("g-5", "dee@example.com", "Dee");
        no_picture.picture = None;
        let user = resolver
            .find_or_create_user(&no_picture, Utc::now())
            .await
            .unwrap();

        assert_eq!(user.avatar_url.as_deref(), Some("https://example.com/a.png"));
    }
}
