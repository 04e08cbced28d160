mod common;

use std::sync::Arc;

use common::{
    Fault, FaultyStore, MockEmailer, STRONG_PASSWORD, TEST_BASE_URL, TEST_HASH_COST,
    extract_raw_token, test_workflow,
};
use handyhub::models::{ResendRequest, SigninRequest, SignupRequest, VerificationToken};
use handyhub::services::{
    hasher::CredentialHasher,
    verification::{VerificationWorkflow, WorkflowError},
};
use handyhub::store::{AccountStore, VerificationStore};
use reqwest::Url;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        username: "Jane Doe".to_string(),
        email: email.to_string(),
        password: STRONG_PASSWORD.to_string(),
        phone: None,
        image: None,
        role: None,
        is_technician: None,
    }
}

fn signin_request(email: &str, password: &str) -> SigninRequest {
    SigninRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[test_log::test(tokio::test)]
async fn hash_and_verify_round_trip() {
    let hasher = CredentialHasher::new(4);

    let hashed = hasher.hash("Abcdef1!").await.unwrap();

    assert_ne!(hashed, "Abcdef1!");
    assert!(hasher.verify("Abcdef1!", &hashed).await);
    assert!(!hasher.verify("Abcdef1?", &hashed).await);
    assert!(!hasher.verify("Abcdef1!", "not a bcrypt hash").await);
}

#[test_log::test(tokio::test)]
async fn hashing_is_salted() {
    let hasher = CredentialHasher::new(4);

    let first = hasher.hash("same secret").await.unwrap();
    let second = hasher.hash("same secret").await.unwrap();

    assert_ne!(first, second);
}

#[test_log::test(tokio::test)]
async fn issued_token_lives_six_hours() {
    let (workflow, _, _) = test_workflow();
    let account_id = Uuid::new_v4();

    let issued = workflow.issue_token(account_id).await.unwrap();

    assert_eq!(issued.record.account_id, account_id);
    assert_eq!(
        issued.record.expires_at - issued.record.created_at,
        Duration::milliseconds(21_600_000)
    );
    assert!(issued.raw.ends_with(&account_id.to_string()));
    assert!(Uuid::parse_str(&issued.raw[..36]).is_ok());
    assert_ne!(issued.record.unique_string, issued.raw);
    assert!(
        CredentialHasher::new(4)
            .verify(&issued.raw, &issued.record.unique_string)
            .await
    );
}

#[test_log::test(tokio::test)]
async fn verification_link_layout() {
    let (workflow, _, _) = test_workflow();
    let account_id = Uuid::new_v4();

    let link = workflow.verification_link(account_id, "raw");

    assert_eq!(link, format!("{TEST_BASE_URL}/user/verify/{account_id}/raw"));
}

#[test_log::test(tokio::test)]
async fn signup_then_verify_then_signin() {
    let (workflow, store, emailer) = test_workflow();

    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();
    assert_eq!(pending.email, "jane@x.com");
    let account = store.find_account(pending.user_id).await.unwrap().unwrap();
    assert!(!account.verified);

    let raw = extract_raw_token(&emailer.last_sent_email().unwrap().body_html);
    workflow
        .verify(&pending.user_id.to_string(), &raw)
        .await
        .unwrap();

    let account = workflow
        .signin(signin_request("jane@x.com", STRONG_PASSWORD))
        .await
        .unwrap();
    assert_eq!(account.id, pending.user_id);
    assert!(account.verified);
    assert!(store.tokens_for(pending.user_id).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn unverified_account_never_signs_in() {
    let (workflow, _, _) = test_workflow();
    workflow.signup(signup_request("jane@x.com")).await.unwrap();

    for password in [STRONG_PASSWORD, "Wrong1234!"] {
        let result = workflow
            .signin(signin_request("jane@x.com", password))
            .await;
        assert!(matches!(result, Err(WorkflowError::NotVerified)));
    }
}

#[test_log::test(tokio::test)]
async fn wrong_token_changes_nothing() {
    let (workflow, store, _) = test_workflow();
    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();
    let before = store.tokens_for(pending.user_id).await.unwrap();

    let result = workflow
        .verify(&pending.user_id.to_string(), "definitely-not-it")
        .await;

    assert!(matches!(result, Err(WorkflowError::InvalidVerification)));
    assert_eq!(store.tokens_for(pending.user_id).await.unwrap(), before);
    assert!(!store.find_account(pending.user_id).await.unwrap().unwrap().verified);
}

#[test_log::test(tokio::test)]
async fn token_expiring_exactly_now_counts_as_expired() {
    let (workflow, store, emailer) = test_workflow();
    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();
    let raw = extract_raw_token(&emailer.last_sent_email().unwrap().body_html);

    let token = store.tokens_for(pending.user_id).await.unwrap().remove(0);
    store.delete_tokens_for(pending.user_id).await.unwrap();
    let now = OffsetDateTime::now_utc();
    store
        .insert_token(VerificationToken {
            created_at: now - Duration::milliseconds(21_600_000),
            expires_at: now,
            ..token
        })
        .await
        .unwrap();

    let result = workflow.verify(&pending.user_id.to_string(), &raw).await;

    assert!(matches!(result, Err(WorkflowError::Expired)));
    assert!(store.find_account(pending.user_id).await.unwrap().is_none());
    assert!(store.tokens_for(pending.user_id).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn expiry_is_judged_on_the_oldest_token() {
    let (workflow, store, _) = test_workflow();
    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();

    let live = store.tokens_for(pending.user_id).await.unwrap().remove(0);
    store.delete_tokens_for(pending.user_id).await.unwrap();
    let expired_at = OffsetDateTime::now_utc() - Duration::minutes(1);
    store
        .insert_token(VerificationToken {
            created_at: expired_at - Duration::hours(6),
            expires_at: expired_at,
            ..live.clone()
        })
        .await
        .unwrap();
    store.insert_token(live).await.unwrap();

    let result = workflow
        .verify(&pending.user_id.to_string(), "irrelevant")
        .await;

    assert!(matches!(result, Err(WorkflowError::Expired)));
    assert!(store.tokens_for(pending.user_id).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn two_resends_leave_one_live_token() {
    let (workflow, store, emailer) = test_workflow();
    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();

    for _ in 0..2 {
        workflow
            .resend(ResendRequest {
                user_id: pending.user_id.to_string(),
                email: "jane@x.com".to_string(),
            })
            .await
            .unwrap();
    }

    assert_eq!(store.tokens_for(pending.user_id).await.unwrap().len(), 1);
    assert_eq!(emailer.sent_count(), 3);

    let raw = extract_raw_token(&emailer.last_sent_email().unwrap().body_html);
    workflow
        .verify(&pending.user_id.to_string(), &raw)
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn resend_send_failure_keeps_new_token() {
    let (workflow, store, emailer) = test_workflow();
    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();
    emailer.set_failing(true);

    let result = workflow
        .resend(ResendRequest {
            user_id: pending.user_id.to_string(),
            email: "jane@x.com".to_string(),
        })
        .await;

    assert!(matches!(result, Err(WorkflowError::Notification(_))));
    assert_eq!(store.tokens_for(pending.user_id).await.unwrap().len(), 1);
    assert!(store.find_account(pending.user_id).await.unwrap().is_some());
}

#[test_log::test(tokio::test)]
async fn concurrent_signups_with_one_email_create_one_account() {
    let (workflow, store, _) = test_workflow();

    let (a, b) = tokio::join!(
        workflow.signup(signup_request("race@x.com")),
        workflow.signup(signup_request("race@x.com")),
    );

    let outcomes = [a.is_ok(), b.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert!(
        matches!(a, Err(WorkflowError::Conflict)) || matches!(b, Err(WorkflowError::Conflict))
    );
    assert_eq!(store.list_accounts().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn verification_link_keeps_base_path_prefix() {
    let store = Arc::new(FaultyStore::new());
    let workflow = VerificationWorkflow::new(
        store.clone(),
        store,
        Arc::new(MockEmailer::new()),
        CredentialHasher::new(TEST_HASH_COST),
        Url::parse("https://handyhub.example/api/").unwrap(),
    );
    let account_id = Uuid::new_v4();

    let link = workflow.verification_link(account_id, "raw");

    assert_eq!(
        link,
        format!("https://handyhub.example/api/user/verify/{account_id}/raw")
    );
}

#[test_log::test(tokio::test)]
async fn failed_token_cleanup_after_match_still_verifies() {
    let (workflow, store, emailer) = test_workflow();
    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();
    let raw = extract_raw_token(&emailer.last_sent_email().unwrap().body_html);
    store.inject(Fault::TokenDelete);

    workflow
        .verify(&pending.user_id.to_string(), &raw)
        .await
        .unwrap();

    let account = store.find_account(pending.user_id).await.unwrap().unwrap();
    assert!(account.verified);
    // the used token is left behind as a tolerated orphan
    assert_eq!(store.tokens_for(pending.user_id).await.unwrap().len(), 1);

    let account = workflow
        .signin(signin_request("jane@x.com", STRONG_PASSWORD))
        .await
        .unwrap();
    assert_eq!(account.id, pending.user_id);
}

#[test_log::test(tokio::test)]
async fn token_lookup_failure_surfaces_as_store_error() {
    let (workflow, store, emailer) = test_workflow();
    let pending = workflow.signup(signup_request("jane@x.com")).await.unwrap();
    let raw = extract_raw_token(&emailer.last_sent_email().unwrap().body_html);
    store.inject(Fault::TokenLookup);

    let result = workflow.verify(&pending.user_id.to_string(), &raw).await;

    let Err(error @ WorkflowError::Store { .. }) = result else {
        panic!("expected a store error, got {result:?}");
    };
    assert_eq!(
        error.to_string(),
        "An error occurred while checking for existing user verification record"
    );
    assert!(!store.find_account(pending.user_id).await.unwrap().unwrap().verified);
    assert_eq!(emailer.sent_count(), 1);

    store.heal(Fault::TokenLookup);
    workflow
        .verify(&pending.user_id.to_string(), &raw)
        .await
        .unwrap();
}
