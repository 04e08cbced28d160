//! # Account Types
//!
//! Account records and the request payloads that create or change them.
//! Payloads are validated here, before anything reaches a store, so the stores
//! only ever see well-formed typed records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validator::{EMAIL_REGEX, USERNAME_REGEX, is_strong_password};

pub const INVALID_USERNAME: &str = "Invalid username entered";
pub const INVALID_EMAIL: &str = "Invalid email entered";
pub const WEAK_PASSWORD: &str = "Password must be at least 8 characters and include uppercase, lowercase, number, and special character.";

/// Marketplace role of an account.
///
/// Corresponds to the PostgreSQL `account_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "account_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Technician,
}

impl Role {
    /// Only the exact string `technician` grants the technician role.
    pub fn from_requested(requested: Option<&str>) -> Self {
        match requested {
            Some("technician") => Role::Technician,
            _ => Role::Customer,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role_str = match self {
            Role::Customer => "customer",
            Role::Technician => "technician",
        };
        write!(f, "{role_str}")
    }
}

/// A stored account. The password is only ever held as a bcrypt hash and is
/// never serialized into responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_technician: bool,
    pub verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated account ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub is_technician: bool,
}

impl NewAccount {
    /// Builds the record for a signup whose payload already passed
    /// [`SignupRequest::violation`].
    ///
    /// `is_technician` follows the role unless the caller set it explicitly.
    pub fn from_signup(request: SignupRequest, password_hash: String) -> Self {
        let role = Role::from_requested(request.role.as_deref());
        let is_technician = request
            .is_technician
            .unwrap_or(role == Role::Technician);

        Self {
            id: Uuid::new_v4(),
            username: request.username,
            email: request.email,
            phone: request.phone,
            image: request.image,
            password_hash,
            role,
            is_technician,
        }
    }

    pub fn into_account(self, now: OffsetDateTime) -> Account {
        Account {
            id: self.id,
            username: self.username,
            email: self.email,
            phone: self.phone,
            image: self.image,
            password_hash: self.password_hash,
            role: self.role,
            is_technician: self.is_technician,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an account. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub password_hash: Option<String>,
}

/// Request payload for `POST /user/signup`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1), regex(path = "*USERNAME_REGEX"))]
    pub username: String,
    #[serde(default)]
    #[validate(regex(path = "*EMAIL_REGEX"))]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub role: Option<String>,
    pub is_technician: Option<bool>,
}

impl SignupRequest {
    /// Returns the message for the first broken rule, checked in the order
    /// username, email, password.
    pub fn violation(&self) -> Option<&'static str> {
        let errors = self.validate().err();
        let failed = |field: &str| {
            errors
                .as_ref()
                .is_some_and(|e| e.field_errors().contains_key(field))
        };

        if failed("username") {
            Some(INVALID_USERNAME)
        } else if failed("email") {
            Some(INVALID_EMAIL)
        } else if !is_strong_password(&self.password) {
            Some(WEAK_PASSWORD)
        } else {
            None
        }
    }
}

/// Request payload for `PUT /user/update/{id}`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdateRequest {
    #[validate(length(min = 1), regex(path = "*USERNAME_REGEX"))]
    pub username: Option<String>,
    #[validate(regex(path = "*EMAIL_REGEX"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
}

impl AccountUpdateRequest {
    /// Same rules as signup, applied only to the fields that are present.
    pub fn violation(&self) -> Option<&'static str> {
        let errors = self.validate().err();
        let failed = |field: &str| {
            errors
                .as_ref()
                .is_some_and(|e| e.field_errors().contains_key(field))
        };

        if failed("username") {
            Some(INVALID_USERNAME)
        } else if failed("email") {
            Some(INVALID_EMAIL)
        } else if self
            .password
            .as_deref()
            .is_some_and(|p| !is_strong_password(p))
        {
            Some(WEAK_PASSWORD)
        } else {
            None
        }
    }
}

/// Request payload for `POST /user/resendVerificationLink`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
}

/// Request payload for `POST /user/signin`
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of an account used when populating order parties.
#[derive(Debug, Clone, Serialize)]
pub struct Party {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<Account> for Party {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
        }
    }
}
