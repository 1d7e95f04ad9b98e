//! Common test utilities and fixtures for integration tests
//!
//! Every test builds its own application over in-memory stores and mock
//! object storage, so tests run without a database or S3.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use carepoint_accounts::{
    AccountsRepositories, Credential, CredentialStore, InMemoryAccountStore, NewUser, User,
};
use carepoint_app::{build_router, AppStores};
use carepoint_appointments::InMemoryAppointmentStore;
use carepoint_auth::{AuthBackend, AuthConfig, Role};
use carepoint_files::InMemoryFileStore;
use carepoint_storage::mock::MockObjectStorage;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "CorrectHorse9";
pub const MULTIPART_BOUNDARY: &str = "carepoint-test-boundary";
pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const TEST_ISSUER: &str = "carepoint-test";

/// Auth settings for the test issuer with the given signing secret and TTL
pub fn auth_config(secret: &str, token_ttl: chrono::Duration) -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(secret.to_string()),
        previous_secret: None,
        issuer: TEST_ISSUER.to_string(),
        token_ttl,
        bcrypt_cost: 4,
    }
}

/// Application under test plus handles on its stores
pub struct TestApp {
    router: Router,
    pub auth: AuthBackend,
    pub accounts: Arc<InMemoryAccountStore>,
    pub files: Arc<InMemoryFileStore>,
    pub storage: MockObjectStorage,
}

/// A stored user with a valid token
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub user: User,
    pub token: String,
}

impl UserFixture {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Status, headers, and raw body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn error_code(&self) -> String {
        self.json()["error"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    pub fn error_message(&self) -> String {
        self.json()["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let auth = AuthBackend::new(&auth_config(TEST_JWT_SECRET, chrono::Duration::hours(1)))
            .unwrap();

        let accounts = Arc::new(InMemoryAccountStore::new());
        let files = Arc::new(InMemoryFileStore::new());
        let storage = MockObjectStorage::new();

        let stores = AppStores {
            accounts: AccountsRepositories::new(accounts.clone(), accounts.clone()),
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            files: files.clone(),
        };
        let router = build_router(stores, auth.clone(), Arc::new(storage.clone()));

        Self {
            router,
            auth,
            accounts,
            files,
            storage,
        }
    }

    /// Store a user with `TEST_PASSWORD` and issue a token for it
    pub async fn create_user(&self, role: Role, first_name: &str) -> UserFixture {
        let email = format!(
            "{}.{}@carepoint.test",
            first_name.to_lowercase(),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let user = User::new(NewUser {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            address: None,
            gender: None,
            date_of_birth: None,
            mobile_number: "+15550100".to_string(),
            email,
            role,
        });
        let password_hash = self.auth.passwords().hash(TEST_PASSWORD).await.unwrap();
        let credential = Credential::new(user.id, user.email.clone(), password_hash);
        let user = self.accounts.create_account(&user, &credential).await.unwrap();

        let token = self
            .auth
            .issue_token(user.id, &user.mobile_number, user.role)
            .unwrap();
        UserFixture { user, token }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    builder(Method::GET, uri, token).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    builder(Method::DELETE, uri, token)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a multipart upload body
pub enum Part<'a> {
    Text(&'a str, String),
    File {
        file_name: &'a str,
        content_type: &'a str,
        content: &'a [u8],
    },
}

pub fn multipart_request(uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                file_name,
                content_type,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    builder(Method::POST, uri, token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A complete upload for `patient_id`
pub fn upload_request(
    token: Option<&str>,
    patient_id: Uuid,
    file_name: &str,
    content: &[u8],
) -> Request<Body> {
    multipart_request(
        "/v1/files",
        token,
        &[
            Part::Text("patient_user_id", patient_id.to_string()),
            Part::Text("category", "Lab Results".to_string()),
            Part::File {
                file_name,
                content_type: "text/plain",
                content,
            },
        ],
    )
}
