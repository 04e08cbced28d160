#![allow(dead_code)]

mod store;

pub use store::{Fault, FaultyStore};

use std::sync::{
    Arc, Mutex, Once,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use handyhub::{
    config::{AppConfig, Environment},
    models::AppState,
    services::{
        hasher::CredentialHasher,
        notification::{EmailError, NotificationSender},
        verification::VerificationWorkflow,
    },
    store::{AccountStore, VerificationStore},
};
use reqwest::{StatusCode, Url, redirect::Policy};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const TEST_BASE_URL: &str = "http://localhost:5000";
pub const TEST_HASH_COST: u32 = 4;
pub const STRONG_PASSWORD: &str = "Abcdef1!";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // test-log may have installed a subscriber already
        let _ = tracing_subscriber::fmt()
            .with_env_filter("handyhub=debug")
            .with_test_writer()
            .try_init();
    });
}

/// A mock email sender that stores sent emails for testing purposes.
/// Delivery can be switched to fail to exercise the error paths.
#[derive(Debug, Default)]
pub struct MockEmailer {
    sent_emails: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
}

impl MockEmailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following send fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all sent emails for testing verification
    pub fn get_sent_emails(&self) -> Vec<SentEmail> {
        self.sent_emails.lock().unwrap().clone()
    }

    /// Clear all stored emails
    pub fn clear(&self) {
        self.sent_emails.lock().unwrap().clear();
    }

    /// Get the count of sent emails
    pub fn sent_count(&self) -> usize {
        self.sent_emails.lock().unwrap().len()
    }

    /// Get the last sent email
    pub fn last_sent_email(&self) -> Option<SentEmail> {
        self.sent_emails.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl NotificationSender for MockEmailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::SendFailed("mock transport down".to_string()));
        }

        self.sent_emails.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body_html: body_html.to_string(),
        });
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        base_url: Url::parse(TEST_BASE_URL).unwrap(),
        port: 0,
        database_url: None,
        mail: None,
        hash_cost: TEST_HASH_COST,
    }
}

/// Workflow wired to a fresh in-memory store, for tests below the HTTP layer.
pub fn test_workflow() -> (VerificationWorkflow, Arc<FaultyStore>, Arc<MockEmailer>) {
    init_tracing_once();

    let store = Arc::new(FaultyStore::new());
    let emailer = Arc::new(MockEmailer::new());
    let accounts: Arc<dyn AccountStore> = store.clone();
    let tokens: Arc<dyn VerificationStore> = store.clone();

    let workflow = VerificationWorkflow::new(
        accounts,
        tokens,
        emailer.clone(),
        CredentialHasher::new(TEST_HASH_COST),
        Url::parse(TEST_BASE_URL).unwrap(),
    );

    (workflow, store, emailer)
}

pub struct TestApp {
    /// Format: `http://127.0.0.1:8492`
    pub address: String,
    pub store: Arc<FaultyStore>,
    pub emailer: Arc<MockEmailer>,
    /// Does not follow redirects so the verification redirect can be inspected.
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/user/signup",
            &json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    /// Signs up, follows the emailed link and returns the new account id.
    pub async fn signup_and_verify(&self, username: &str, email: &str, role: &str) -> Uuid {
        let response = self
            .post_json(
                "/user/signup",
                &json!({
                    "username": username,
                    "email": email,
                    "password": STRONG_PASSWORD,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        let user_id: Uuid = body["data"]["userId"].as_str().unwrap().parse().unwrap();

        let sent = self.emailer.last_sent_email().expect("No email sent");
        let response = self.get(&extract_verification_path(&sent.body_html)).await;
        assert_eq!(response.status(), StatusCode::OK);

        user_id
    }
}

/// Spawns the application on a random port with an in-memory store and a
/// capturing emailer.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

/// Same as [`spawn_app`] with a custom configuration.
pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    init_tracing_once();

    let store = Arc::new(FaultyStore::new());
    let emailer = Arc::new(MockEmailer::new());
    let state = Arc::new(AppState::new(store.clone(), emailer.clone(), config));

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, handyhub::app(state)).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    // Wait for server to be ready
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        store,
        emailer,
        client,
    }
}

/// Helper function to extract `/user/verify/<id>/<token>` from an email body
pub fn extract_verification_path(email_body: &str) -> String {
    let start = email_body
        .find("/user/verify/")
        .expect("No verification link in email");
    let rest = &email_body[start..];
    let end = rest.find('"').expect("Unterminated verification link");
    rest[..end].to_string()
}

/// Raw token part of the verification link in an email body.
pub fn extract_raw_token(email_body: &str) -> String {
    let path = extract_verification_path(email_body);
    path.rsplit('/').next().unwrap().to_string()
}
