// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod availability;
pub mod booking;
pub mod google_oidc;
pub mod identity;

pub use availability::{AvailabilityService, BulkCreateReport, SlotTemplate};
pub use booking::{BookingReport, BookingService};
pub use google_oidc::{GoogleIdTokenVerifier, IdentityError, VerifiedIdentity};
pub use identity::{IdentityResolver, Session};
