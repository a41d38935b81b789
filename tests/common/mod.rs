// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use wellvantage_api::config::Config;
use wellvantage_api::db::{Database, FirestoreDb, MemoryDb};
use wellvantage_api::routes::create_router;
use wellvantage_api::services::{
    AvailabilityService, BookingService, GoogleIdTokenVerifier, IdentityResolver,
};
use wellvantage_api::AppState;

pub const TEST_KID: &str = "test-kid";
const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa_private.pem");
const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/test_rsa_public.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Verifier that trusts the fixture RSA key instead of Google's JWKS.
#[allow(dead_code)]
pub fn test_verifier(config: &Config) -> GoogleIdTokenVerifier {
    let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
    GoogleIdTokenVerifier::new_with_static_key(config, TEST_KID, key).unwrap()
}

/// Build the full app over the given store.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: Database) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let identity = IdentityResolver::new(
        Arc::new(test_verifier(&config)),
        db.clone(),
        config.jwt_signing_key.clone(),
        config.session_ttl_days,
    );

    let state = Arc::new(AppState {
        config,
        availability: AvailabilityService::new(db.clone()),
        booking: BookingService::new(db.clone()),
        identity,
        db,
    });

    (create_router(state.clone()), state)
}

/// Create a test app over an empty in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(Database::Memory(MemoryDb::new()))
}

/// Create a session token the way the login route does.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_test_jwt_with_exp(user_id, signing_key, now_secs() + 86400)
}

#[allow(dead_code)]
pub fn create_test_jwt_with_exp(user_id: &str, signing_key: &[u8], exp: usize) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        iat: now_secs(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Claims of a valid Google ID token for the test client ID.
#[allow(dead_code)]
pub fn google_claims(sub: &str, email: &str, name: &str) -> serde_json::Value {
    let now = now_secs();
    serde_json::json!({
        "iss": "https://accounts.google.com",
        "aud": "test-client-id.apps.googleusercontent.com",
        "sub": sub,
        "email": email,
        "email_verified": true,
        "name": name,
        "picture": format!("https://example.com/{sub}.png"),
        "iat": now,
        "exp": now + 3600,
    })
}

/// Sign ID token claims with the fixture private key.
#[allow(dead_code)]
pub fn sign_id_token(claims: &serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Send a request with an optional bearer token and JSON body; returns the
/// status and the parsed JSON body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Sign in through `/auth/login` and return the session token and user id.
#[allow(dead_code)]
pub async fn login(app: &axum::Router, sub: &str, email: &str, name: &str) -> (String, String) {
    let id_token = sign_id_token(&google_claims(sub, email, name));
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(serde_json::json!({ "identityToken": id_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}
