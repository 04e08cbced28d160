//! # Business Logic Services
//!
//! This module contains the account lifecycle services of the Handyhub application.
//! Handlers reach them through [`AppState`](crate::models::AppState).
//!
//! ## Available Services
//!
//! - **Hasher** (`hasher`) - bcrypt hashing for passwords and verification tokens
//! - **Notification** (`notification`) - Email delivery with multiple implementations
//! - **Verification** (`verification`) - Signup, link verification and signin

pub mod hasher;
pub mod notification;
pub mod verification;
