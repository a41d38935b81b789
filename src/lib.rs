// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! WellVantage: scheduling and workout tracking for personal trainers
//!
//! This crate provides the backend API: Google sign-in, availability slots
//! with at-most-once booking, and owner-scoped client and workout plan
//! directories.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{AvailabilityService, BookingService, IdentityResolver};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub identity: IdentityResolver,
    pub availability: AvailabilityService,
    pub booking: BookingService,
}
