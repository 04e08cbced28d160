//! # Verification Workflow
//!
//! Drives an account through its credential lifecycle:
//!
//! 1. **Signup** stores an unverified account and mails a verification link
//! 2. **Resend** replaces every pending token with a fresh one
//! 3. **Verify** checks the link; an expired link removes the abandoned signup
//! 4. **Signin** is only possible once the account is verified
//!
//! The raw token only ever exists in the emailed link; stores hold its bcrypt
//! hash.

use std::sync::Arc;

use reqwest::Url;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::hasher::{CredentialHasher, HashError};
use super::notification::{EmailError, NotificationSender};
use crate::models::{
    Account, IssuedToken, NewAccount, ResendRequest, SigninRequest, SignupRequest,
    VerificationToken,
};
use crate::store::{AccountStore, StoreError, VerificationStore};
use crate::utils::{
    constant::{VERIFICATION_EMAIL_SUBJECT, VERIFICATION_TOKEN_TTL},
    html::verification_email_html,
};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Email already exists")]
    Conflict,

    #[error(
        "Account record doesn't exist or has been verified already. Please sign up or log in."
    )]
    NoPendingVerification,

    #[error("Link has expired. Please sign up again.")]
    Expired,

    #[error("Invalid verification details passed. Check your inbox.")]
    InvalidVerification,

    #[error("Empty credentials supplied!")]
    EmptyCredentials,

    #[error("Invalid credentials entered!")]
    InvalidCredentials,

    #[error("Email hasn't been verified yet. Check your inbox.")]
    NotVerified,

    #[error("Invalid password entered!")]
    InvalidPassword,

    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("An error occurred while hashing!")]
    Hashing(#[from] HashError),

    #[error(transparent)]
    Notification(#[from] EmailError),
}

/// Wraps a store failure with the message shown to the client.
fn store_failure(context: &'static str) -> impl FnOnce(StoreError) -> WorkflowError {
    move |source| WorkflowError::Store { context, source }
}

/// Appends `path` to the path of `base`, so a prefix such as `/api` in the
/// configured base URL is kept. Query and fragment of `base` are dropped.
pub fn under_base(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}{path}", base.path().trim_end_matches('/'));
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Returned while an account waits for its link to be followed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    pub user_id: Uuid,
    pub email: String,
}

pub struct VerificationWorkflow {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<dyn VerificationStore>,
    notifier: Arc<dyn NotificationSender>,
    hasher: CredentialHasher,
    base_url: Url,
}

impl VerificationWorkflow {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<dyn VerificationStore>,
        notifier: Arc<dyn NotificationSender>,
        hasher: CredentialHasher,
        base_url: Url,
    ) -> Self {
        Self {
            accounts,
            tokens,
            notifier,
            hasher,
            base_url,
        }
    }

    /// Creates an unverified account and mails its verification link.
    ///
    /// If the link cannot be delivered the account and its token are removed
    /// again, so the address is free for another attempt.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Validation`] - username, email or password rejected
    /// - [`WorkflowError::Conflict`] - the email is already registered
    /// - [`WorkflowError::Notification`] - the email could not be sent
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn signup(
        &self,
        request: SignupRequest,
    ) -> Result<PendingVerification, WorkflowError> {
        if let Some(message) = request.violation() {
            debug!(message, "Signup payload rejected");
            return Err(WorkflowError::Validation(message));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let account = NewAccount::from_signup(request, password_hash);

        let account = self
            .accounts
            .create_account(account)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => WorkflowError::Conflict,
                source => WorkflowError::Store {
                    context: "Failed to create user",
                    source,
                },
            })?;
        info!(user_id = %account.id, role = %account.role, "Account created, unverified");

        if let Err(e) = self.send_verification(account.id, &account.email).await {
            warn!(user_id = %account.id, error = %e, "Verification link not delivered, discarding signup");
            self.discard_signup(account.id).await;
            return Err(e);
        }

        Ok(PendingVerification {
            user_id: account.id,
            email: account.email,
        })
    }

    /// Deletes every pending token of the account and mails a fresh link.
    ///
    /// The account itself is not looked up; a link for an unknown or already
    /// verified id simply never matches anything.
    #[instrument(skip_all, fields(user_id = %request.user_id))]
    pub async fn resend(
        &self,
        request: ResendRequest,
    ) -> Result<PendingVerification, WorkflowError> {
        let user_id = request.user_id.trim();
        let email = request.email.trim();
        if user_id.is_empty() || email.is_empty() {
            return Err(WorkflowError::Validation(
                "Empty user details are not allowed",
            ));
        }

        let account_id = Uuid::parse_str(user_id)
            .map_err(|_| WorkflowError::Validation("Invalid user id"))?;

        let purged = self
            .tokens
            .delete_tokens_for(account_id)
            .await
            .map_err(store_failure(
                "An error occurred while clearing previous verification records",
            ))?;
        debug!(purged, "Previous verification tokens removed");

        self.send_verification(account_id, email).await?;
        info!("Verification link resent");

        Ok(PendingVerification {
            user_id: account_id,
            email: email.to_string(),
        })
    }

    /// Checks a followed verification link.
    ///
    /// Only the oldest pending token is considered. An expired token removes
    /// both the tokens and the unverified account. A mismatch changes nothing.
    #[instrument(skip(self, raw_token))]
    pub async fn verify(&self, user_id: &str, raw_token: &str) -> Result<(), WorkflowError> {
        let Ok(account_id) = Uuid::parse_str(user_id) else {
            debug!("Malformed user id in verification link");
            return Err(WorkflowError::NoPendingVerification);
        };

        let tokens = self
            .tokens
            .tokens_for(account_id)
            .await
            .map_err(store_failure(
                "An error occurred while checking for existing user verification record",
            ))?;

        let Some(token) = tokens.first() else {
            debug!("No pending verification for account");
            return Err(WorkflowError::NoPendingVerification);
        };

        if token.is_expired_at(OffsetDateTime::now_utc()) {
            info!(expires_at = %token.expires_at, "Verification link expired, removing signup");
            self.tokens
                .delete_tokens_for(account_id)
                .await
                .map_err(store_failure(
                    "An error occurred while clearing expired user verification record",
                ))?;
            self.accounts
                .delete_account(account_id)
                .await
                .map_err(store_failure("Clearing User with Expired unique string failed"))?;
            return Err(WorkflowError::Expired);
        }

        if !self.hasher.verify(raw_token, &token.unique_string).await {
            warn!("Verification token mismatch");
            return Err(WorkflowError::InvalidVerification);
        }

        let updated = self
            .accounts
            .mark_verified(account_id)
            .await
            .map_err(store_failure(
                "An error occurred while updating user record to show verified",
            ))?;

        if !updated {
            warn!("Token matched but account no longer exists, dropping tokens");
            if let Err(e) = self.tokens.delete_tokens_for(account_id).await {
                warn!(error = %e, "Failed to drop orphaned verification tokens");
            }
            return Err(WorkflowError::NoPendingVerification);
        }

        if let Err(e) = self.tokens.delete_token(account_id).await {
            warn!(error = %e, "Failed to delete used verification token");
        }

        info!("Account verified");
        Ok(())
    }

    /// Checks credentials of a verified account.
    ///
    /// The password of an unverified account is never compared.
    #[instrument(skip_all)]
    pub async fn signin(&self, request: SigninRequest) -> Result<Account, WorkflowError> {
        let email = request.email.trim();
        let password = request.password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(WorkflowError::EmptyCredentials);
        }

        let account = self
            .accounts
            .find_account_by_email(email)
            .await
            .map_err(store_failure(
                "An error occured while checking for existing user",
            ))?
            .ok_or(WorkflowError::InvalidCredentials)?;

        if !account.verified {
            debug!(user_id = %account.id, "Signin attempt on unverified account");
            return Err(WorkflowError::NotVerified);
        }

        if self.hasher.verify(password, &account.password_hash).await {
            info!(user_id = %account.id, "Signin successful");
            Ok(account)
        } else {
            warn!(user_id = %account.id, "Signin with wrong password");
            Err(WorkflowError::InvalidPassword)
        }
    }

    /// Generates a raw token for `account_id` and its hashed record.
    ///
    /// The raw value is a v4 UUID followed by the account id.
    pub async fn issue_token(&self, account_id: Uuid) -> Result<IssuedToken, HashError> {
        let raw = format!("{}{}", Uuid::new_v4(), account_id);
        let unique_string = self.hasher.hash(&raw).await?;
        let created_at = OffsetDateTime::now_utc();

        Ok(IssuedToken {
            raw,
            record: VerificationToken {
                account_id,
                unique_string,
                created_at,
                expires_at: created_at + VERIFICATION_TOKEN_TTL,
            },
        })
    }

    /// `<base_url>/user/verify/<account_id>/<raw_token>`
    pub fn verification_link(&self, account_id: Uuid, raw_token: &str) -> String {
        under_base(
            &self.base_url,
            &format!("/user/verify/{account_id}/{raw_token}"),
        )
        .to_string()
    }

    async fn send_verification(&self, account_id: Uuid, email: &str) -> Result<(), WorkflowError> {
        let issued = self.issue_token(account_id).await?;
        self.tokens
            .insert_token(issued.record)
            .await
            .map_err(store_failure("Couldn't save verification email data!"))?;

        let link = self.verification_link(account_id, &issued.raw);
        self.notifier
            .send(
                email,
                VERIFICATION_EMAIL_SUBJECT,
                &verification_email_html(&link),
            )
            .await?;

        debug!("Verification email handed to sender");
        Ok(())
    }

    async fn discard_signup(&self, account_id: Uuid) {
        if let Err(e) = self.tokens.delete_tokens_for(account_id).await {
            warn!(user_id = %account_id, error = %e, "Failed to remove tokens of discarded signup");
        }
        if let Err(e) = self.accounts.delete_account(account_id).await {
            warn!(user_id = %account_id, error = %e, "Failed to remove discarded account");
        }
    }
}
