//! # User Handlers
//!
//! Account lifecycle endpoints under `/user`:
//!
//! 1. Signing up and receiving a verification link by email
//! 2. Requesting a fresh link
//! 3. Following the link, which lands on the verified page
//! 4. Signing in once verified
//!
//! Plus plain profile CRUD (list, get, update, delete).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::{
    AccountChanges, AccountUpdateRequest, AppState, Envelope, ResendRequest, SigninRequest,
    SignupRequest, Status,
};
use crate::services::verification::{WorkflowError, under_base};
use crate::store::{AccountStore, VerificationStore};
use crate::utils::html::verified_page_html;

const RESEND_ERROR_PREFIX: &str = "Verification Link Resend Error. ";

/// HTTP status for a workflow failure.
fn workflow_status(e: &WorkflowError) -> StatusCode {
    match e {
        WorkflowError::Validation(_)
        | WorkflowError::EmptyCredentials
        | WorkflowError::NoPendingVerification
        | WorkflowError::Expired
        | WorkflowError::InvalidVerification => StatusCode::BAD_REQUEST,
        WorkflowError::Conflict => StatusCode::CONFLICT,
        WorkflowError::InvalidCredentials | WorkflowError::InvalidPassword => {
            StatusCode::UNAUTHORIZED
        }
        WorkflowError::NotVerified => StatusCode::FORBIDDEN,
        WorkflowError::Store { .. }
        | WorkflowError::Hashing(_)
        | WorkflowError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn workflow_failure(e: WorkflowError, prefix: &str) -> Response {
    let status = workflow_status(&e);
    if status.is_server_error() {
        error!(error = ?e, "Workflow dependency failed");
    } else {
        warn!(reason = %e, "Workflow request rejected");
    }
    Envelope::failed(format!("{prefix}{e}")).reply(status)
}

/// Creates an unverified account and emails its verification link.
///
/// POST /user/signup
///
/// # Returns
///
/// - `201 Created` - `PENDING` with `{userId, email}`
/// - `400 Bad Request` - Username, email or password rejected
/// - `409 Conflict` - Email already registered
/// - `500 Internal Server Error` - Hashing, store or email failure
#[instrument(
    skip_all,
    fields(
        email = %payload.email,
        request_id = %Uuid::new_v4()
    )
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Response {
    debug!("Processing signup request");

    match state.workflow.signup(payload).await {
        Ok(pending) => {
            info!(user_id = %pending.user_id, "Signup pending verification");
            Envelope::new(Status::Pending, "Verification email sent", Some(pending))
                .reply(StatusCode::CREATED)
        }
        Err(e) => workflow_failure(e, ""),
    }
}

/// Replaces pending tokens of an account and emails a new link.
///
/// POST /user/resendVerificationLink
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn resend_verification_link(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<ResendRequest>,
) -> Response {
    debug!(user_id = %payload.user_id, "Processing resend request");

    match state.workflow.resend(payload).await {
        Ok(pending) => Envelope::new(Status::Pending, "Verification email sent", Some(pending))
            .reply(StatusCode::OK),
        Err(e) => workflow_failure(e, RESEND_ERROR_PREFIX),
    }
}

/// Target of the emailed link.
///
/// GET /user/verify/{user_id}/{unique_string}
///
/// Success renders the verified page directly; any failure redirects to
/// `/user/verified?error=true&message=...`.
#[instrument(
    skip(state, unique_string),
    fields(request_id = %Uuid::new_v4())
)]
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Path((user_id, unique_string)): Path<(String, String)>,
) -> Response {
    debug!("Processing verification link");

    match state.workflow.verify(&user_id, &unique_string).await {
        Ok(()) => Html(verified_page_html(None)).into_response(),
        Err(e) => {
            if workflow_status(&e).is_server_error() {
                error!(error = ?e, "Verification failed on a dependency");
            } else {
                warn!(reason = %e, "Verification link rejected");
            }
            let location = verified_redirect(&state.config.base_url, &e.to_string());
            Redirect::to(&location).into_response()
        }
    }
}

fn verified_redirect(base_url: &Url, message: &str) -> String {
    let mut url = under_base(base_url, "/user/verified");
    url.query_pairs_mut()
        .clear()
        .append_pair("error", "true")
        .append_pair("message", message);
    url.to_string()
}

#[derive(Debug, Deserialize)]
pub struct VerifiedQuery {
    pub error: Option<bool>,
    pub message: Option<String>,
}

/// GET /user/verified
#[instrument(skip_all)]
pub async fn verified_page(Query(query): Query<VerifiedQuery>) -> Html<String> {
    match query.error {
        Some(true) => {
            let message = query
                .message
                .as_deref()
                .unwrap_or("An error occurred during verification.");
            Html(verified_page_html(Some(message)))
        }
        _ => Html(verified_page_html(None)),
    }
}

/// Signs in a verified account.
///
/// POST /user/signin
///
/// # Returns
///
/// - `200 OK` - `SUCCESFUL` with the account
/// - `400 Bad Request` - Empty email or password
/// - `401 Unauthorized` - Unknown email or wrong password
/// - `403 Forbidden` - Email not verified yet
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn signin(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<SigninRequest>,
) -> Response {
    debug!("Processing signin request");

    match state.workflow.signin(payload).await {
        Ok(account) => Envelope::new(Status::Succesful, "Signin successful", Some(account))
            .reply(StatusCode::OK),
        Err(e) => workflow_failure(e, ""),
    }
}

/// GET /user/getUsers
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn list_users(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    let accounts = state.store.list_accounts().await?;
    debug!(count = accounts.len(), "Fetched accounts");
    Ok(Json(Envelope::success("Users fetched successfully", accounts)))
}

/// GET /user/getProfile/{id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;
    let account = state
        .store
        .find_account(id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    Ok(Json(Envelope::success("User fetched successfully", account)))
}

/// Partial profile update. A new password is re-hashed before storing.
///
/// PUT /user/update/{id}
#[instrument(skip(state, payload), fields(request_id = %Uuid::new_v4()))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AccountUpdateRequest>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;

    if let Some(message) = payload.violation() {
        warn!(message, "Profile update rejected");
        return Err(AppError::bad_request(message));
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(state.hasher.hash(password).await?),
        None => None,
    };

    let changes = AccountChanges {
        username: payload.username,
        email: payload.email,
        phone: payload.phone,
        image: payload.image,
        password_hash,
    };

    let account = state
        .store
        .update_account(id, changes)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    info!(user_id = %account.id, "Profile updated");
    Ok(Json(Envelope::success("User updated successfully", account)))
}

/// Deletes an account together with any pending verification tokens.
///
/// DELETE /user/delete/{id}
#[instrument(skip(state), fields(request_id = %Uuid::new_v4()))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = Uuid::parse_str(&id)?;

    // tokens go before the account
    let purged = state.store.delete_tokens_for(id).await?;
    if !state.store.delete_account(id).await? {
        return Err(AppError::NotFound("User not found"));
    }

    info!(user_id = %id, purged, "Account deleted");
    Ok(Json(Envelope::done("User deleted successfully")))
}
