// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables via secret bindings,
//! so everything is read once at startup and kept in memory.

use std::env;

const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
const MAX_SESSION_TTL_DAYS: i64 = 365;

/// Which store backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Cloud Firestore (or the emulator when `FIRESTORE_EMULATOR_HOST` is set).
    Firestore,
    /// In-process store, lost on restart. Local development only.
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Google OAuth client IDs accepted as ID token audiences
    /// (web, iOS and Android clients each have their own).
    pub google_client_ids: Vec<String>,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Session token lifetime in days
    pub session_ttl_days: i64,
    /// Store implementation
    pub storage_backend: StorageBackend,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let google_client_ids = parse_client_ids(
            &env::var("GOOGLE_CLIENT_ID").map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
        );
        if google_client_ids.is_empty() {
            return Err(ConfigError::Missing("GOOGLE_CLIENT_ID"));
        }

        let session_ttl_days = match env::var("SESSION_TTL_DAYS") {
            Ok(raw) => parse_session_ttl_days(raw)?,
            Err(_) => DEFAULT_SESSION_TTL_DAYS,
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .parse()?;

        Ok(Self {
            google_client_ids,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_ttl_days,
            storage_backend,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .trim()
                .to_string()
                .into_bytes(),
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            google_client_ids: vec!["test-client-id.apps.googleusercontent.com".to_string()],
            frontend_url: "http://localhost:8081".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            storage_backend: StorageBackend::Memory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Session lifetime in whole days, between 1 and `MAX_SESSION_TTL_DAYS`.
fn parse_session_ttl_days(raw: String) -> Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|days| (1..=MAX_SESSION_TTL_DAYS).contains(days))
        .ok_or(ConfigError::Invalid {
            name: "SESSION_TTL_DAYS",
            value: raw,
        })
}

fn parse_client_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
