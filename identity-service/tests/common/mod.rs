use std::sync::Arc;
use std::time::Duration as StdDuration;

use auth::Argon2Verifier;
use auth::Authenticator;
use auth::JwtHandler;
use auth::ManualClock;
use chrono::DateTime;
use chrono::Duration;
use identity_service::domain::account::service::AccountService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryAccountRepository;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

pub const TOKEN_TTL_HOURS: i64 = 1;

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    /// Drives token expiry on the server side
    pub clock: Arc<ManualClock>,
    /// Signs with the server's secret, for hand-crafted tokens
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));

        let authenticator = Arc::new(
            Authenticator::new(
                JwtHandler::new(JWT_SECRET).with_clock(clock.clone()),
                Duration::hours(TOKEN_TTL_HOURS),
            )
            // Cheap parameters keep the suite fast
            .with_credential_verifier(Arc::new(
                Argon2Verifier::with_params(1024, 1, 1).expect("Invalid Argon2 parameters"),
            )),
        );

        let account_service = Arc::new(AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::clone(&authenticator),
        ));

        let router = create_router(account_service, authenticator, StdDuration::from_secs(5));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET).with_clock(clock.clone()),
            clock,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register an account and return its token
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let response = self
            .post("/api/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }
}

/// Flip one character of the signature segment
pub fn tamper(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').expect("Not a JWT");
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", head, chars.into_iter().collect::<String>())
}
