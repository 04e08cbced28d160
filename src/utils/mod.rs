//! # Utility Modules
//!
//! This module contains utility functions, constants, and validators used
//! throughout the Handyhub application.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Token lifetime, hashing cost and startup defaults
//! - **HTML** (`html`) - Verification email body and landing page
//! - **Secrets** (`secret`) - Env/file secret lookup
//! - **Validators** (`validator`) - Input validation patterns

pub mod constant;
pub mod html;
pub mod secret;
pub mod validator;
