//! # Application Constants
//!
//! This module defines configuration constants used throughout the Handyhub application.
//! These constants control token lifetimes, hashing cost and startup defaults.

use std::{ops::RangeInclusive, time::Duration};

/// Lifetime of an emailed verification link
///
/// A token presented after this duration is treated as an abandoned signup:
/// the token and its unverified account are both removed.
pub const VERIFICATION_TOKEN_TTL: Duration = Duration::from_millis(21_600_000); // 6 hours

/// Default bcrypt cost used for passwords and verification tokens
pub const DEFAULT_HASH_COST: u32 = 10;

/// Costs bcrypt accepts
pub const HASH_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// Port the server listens on when `PORT` is not set
pub const DEFAULT_PORT: u16 = 5000;

/// Base URL embedded in verification links outside production
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:5000";

/// Subject line of the verification email
pub const VERIFICATION_EMAIL_SUBJECT: &str = "Verify Your Email";

/// Maximum number of pooled PostgreSQL connections
pub const DB_MAX_CONNECTIONS: u32 = 10;
