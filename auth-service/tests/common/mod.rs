use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth_service::domain::auth::cache::CacheSettings;
use auth_service::domain::auth::models::EmailAddress;
use auth_service::domain::auth::models::Provenance;
use auth_service::domain::auth::models::RegisterCommand;
use auth_service::domain::auth::models::Role;
use auth_service::domain::auth::models::Username;
use auth_service::domain::auth::ports::AuthServicePort;
use auth_service::domain::auth::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::cache::InMemoryDirectoryCache;
use auth_service::outbound::events::NoopEventNotifier;
use auth_service::outbound::repositories::InMemoryServiceKeyStore;
use auth_service::outbound::repositories::InMemorySessionStore;
use auth_service::outbound::repositories::InMemoryUserDirectory;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "Secret123!";

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub auth_service: Arc<dyn AuthServicePort>,
    pub service_keys: Arc<InMemoryServiceKeyStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub token_codec: TokenCodec,
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

        // Cheap argon2 parameters keep the suite fast
        let password_hasher =
            PasswordHasher::with_cost(1024, 1, 1).expect("Failed to build password hasher");
        let authenticator = Arc::new(
            Authenticator::new(
                JWT_SECRET,
                chrono::Duration::minutes(15),
                chrono::Duration::days(7),
            )
            .with_password_hasher(password_hasher),
        );

        let service_keys = Arc::new(InMemoryServiceKeyStore::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let auth_service: Arc<dyn AuthServicePort> = Arc::new(AuthService::new(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::clone(&sessions),
            Arc::clone(&service_keys),
            Arc::new(InMemoryDirectoryCache::new()),
            Arc::new(NoopEventNotifier),
            authenticator,
            CacheSettings::default(),
        ));

        let router = create_router(Arc::clone(&auth_service), Duration::from_secs(30));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            auth_service,
            service_keys,
            sessions,
            token_codec: TokenCodec::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Register through the API and return the token bundle
    pub async fn register(&self, username: &str, email: &str) -> Value {
        let response = self
            .post("/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Seed an admin directly through the service; admins cannot self-register
    pub async fn seed_admin(&self, username: &str, email: &str) -> String {
        let command = RegisterCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            PASSWORD.to_string(),
        )
        .with_role(Role::admin());

        self.auth_service
            .register(command, Provenance::default())
            .await
            .expect("Failed to seed admin")
            .access_token
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post("/auth/refresh-token")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Pull a string field out of a JSON body
pub fn field(body: &Value, key: &str) -> String {
    body[key]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field {}", key))
        .to_string()
}
