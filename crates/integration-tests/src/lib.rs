//! Integration test harness for the Teeforge storefront.
//!
//! [`TestApp::spawn`] starts a [`MockBackend`] and the storefront router on
//! ephemeral ports and returns a client that keeps the session cookie, so a
//! test reads like a shopper clicking through the site.
//!
//! The mock answers the REST routes the storefront uses with canned records,
//! records every call in arrival order, and can be told to fail individual
//! paths.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p teeforge-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::{BTreeMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use teeforge_storefront::config::{BackendConfig, DesignerConfig, StorefrontConfig};
use teeforge_storefront::middleware::create_session_layer;
use teeforge_storefront::state::AppState;
use tower_sessions::MemoryStore;
use url::Url;

/// Password accepted for every seeded account.
pub const PASSWORD: &str = "secret";
/// Seeded customer account.
pub const CUSTOMER: &str = "thandi";
/// Seeded administrator account.
pub const ADMIN: &str = "admin";

/// Message the mock sends with every forced failure.
pub const FAILURE_MESSAGE: &str = "Service unavailable";

/// One request received by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    /// Parsed JSON body, `Value::Null` for empty or non-JSON bodies.
    pub body: Value,
    pub body_len: usize,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    failing: HashSet<String>,
    customers: BTreeMap<i64, Value>,
    tshirts: BTreeMap<i64, Value>,
    next_id: i64,
}

/// In-process stand-in for the Teeforge REST backend.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn customer_json(id: i64, first: &str, last: &str, user_name: &str) -> Value {
    json!({
        "userId": id,
        "firstName": first,
        "lastName": last,
        "userName": user_name,
        "address": {
            "addressId": id * 10,
            "street": "12 Long Street",
            "municipality": "Cape Town",
            "province": "Western Cape",
            "postalCode": "8001",
            "country": "South Africa"
        },
        "contact": {
            "contactId": id * 10,
            "email": format!("{user_name}@example.com"),
            "phoneNumber": "0821234567"
        },
        "customerDiscount": 0.0,
        "active": true
    })
}

fn tshirt_json(id: i64, name: &str, price: impl Into<Value>) -> Value {
    json!({
        "tshirtId": id,
        "name": name,
        "description": "",
        "price": price.into(),
        "color": "black",
        "size": "M",
        "view": "front"
    })
}

impl MockBackend {
    /// Add or replace a saved t-shirt. `price` is sent as a JSON string so
    /// amounts beyond `f64` precision survive.
    pub fn insert_tshirt(&self, id: i64, name: &str, price: &str) {
        self.lock().tshirts.insert(id, tshirt_json(id, name, price));
    }

    /// A backend with two customers, Thandi Nkosi (id 1) and Pieter Botha
    /// (id 2), and two saved t-shirts: Sunset tee (id 7, R299.99) and Ocean
    /// tee (id 8, R50.50).
    #[must_use]
    pub fn new() -> Self {
        let mut customers = BTreeMap::new();
        customers.insert(1, customer_json(1, "Thandi", "Nkosi", CUSTOMER));
        customers.insert(2, customer_json(2, "Pieter", "Botha", "pieter"));
        let mut tshirts = BTreeMap::new();
        tshirts.insert(7, tshirt_json(7, "Sunset tee", 299.99));
        tshirts.insert(8, tshirt_json(8, "Ocean tee", 50.50));
        Self {
            state: Arc::new(Mutex::new(MockState {
                customers,
                tshirts,
                next_id: 100,
                ..MockState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Answer `path` with a 500 and a `message` body from now on.
    pub fn fail(&self, path: &str) {
        self.lock().failing.insert(path.to_owned());
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Paths of the calls received so far, oldest first.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.path.clone()).collect()
    }

    /// Calls matching a method and path.
    #[must_use]
    pub fn calls_to(&self, method: &Method, path: &str) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.method == *method && c.path == path)
            .cloned()
            .collect()
    }

    /// Forget recorded calls, e.g. the ones made while signing in.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    #[must_use]
    pub fn customer_ids(&self) -> Vec<i64> {
        self.lock().customers.keys().copied().collect()
    }

    /// Serve on an ephemeral port and return the address.
    pub async fn serve(self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let router = Router::new().fallback(handle).with_state(self);
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock backend");
        });
        addr
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response()
}

fn with_id(mut body: Value, key: &str, id: i64) -> Value {
    if let Some(obj) = body.as_object_mut() {
        obj.insert(key.to_owned(), id.into());
    }
    body
}

async fn handle(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    let json_body = if is_json {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    } else {
        Value::Null
    };

    let mut state = mock.lock();
    state.calls.push(RecordedCall {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_owned),
        body: json_body.clone(),
        body_len: body.len(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    });

    if state.failing.contains(&path) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": FAILURE_MESSAGE })),
        )
            .into_response();
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        (Method::POST, ["auth", "login"]) => {
            let user_name = json_body["userName"].as_str().unwrap_or_default();
            let password = json_body["password"].as_str().unwrap_or_default();
            match (user_name, password) {
                (CUSTOMER, PASSWORD) => {
                    let mut user = state.customers.get(&1).cloned().unwrap_or_default();
                    user["role"] = "CUSTOMER".into();
                    user["token"] = "token-thandi".into();
                    Json(user).into_response()
                }
                (ADMIN, PASSWORD) => Json(json!({
                    "token": "token-admin",
                    "user": {
                        "userId": 900,
                        "firstName": "Ayanda",
                        "lastName": "Dlamini",
                        "userName": ADMIN,
                        "role": "ADMIN",
                        "adminLevel": "SUPER"
                    }
                }))
                .into_response(),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid username or password" })),
                )
                    .into_response(),
            }
        }
        (Method::POST, ["auth", "register"]) => {
            let id = state.next_id;
            state.next_id += 1;
            let mut created = with_id(json_body, "userId", id);
            if let Some(obj) = created.as_object_mut() {
                obj.remove("password");
            }
            state.customers.insert(id, created.clone());
            (StatusCode::CREATED, Json(created)).into_response()
        }
        (Method::GET, ["api", "customer", id]) => id
            .parse::<i64>()
            .ok()
            .and_then(|id| state.customers.get(&id).cloned())
            .map_or_else(not_found, |c| Json(c).into_response()),
        (Method::PUT, ["api", "customer"]) => Json(json_body).into_response(),
        (Method::GET, ["api", "admin", "customers"]) => {
            Json(state.customers.values().cloned().collect::<Vec<_>>()).into_response()
        }
        (Method::GET, ["api", "admin", "customers", "search"]) => {
            let name = uri
                .query()
                .and_then(|q| q.strip_prefix("name="))
                .unwrap_or_default()
                .to_lowercase();
            let found: Vec<Value> = state
                .customers
                .values()
                .filter(|c| {
                    c["firstName"]
                        .as_str()
                        .is_some_and(|n| n.to_lowercase().contains(&name))
                })
                .cloned()
                .collect();
            Json(found).into_response()
        }
        (Method::POST, ["api", "admin", "customers"]) => {
            let id = state.next_id;
            state.next_id += 1;
            let created = with_id(json_body, "userId", id);
            state.customers.insert(id, created.clone());
            (StatusCode::CREATED, Json(created)).into_response()
        }
        (Method::PUT, ["api", "admin", "customers"]) => {
            match json_body["userId"].as_i64() {
                Some(id) if state.customers.contains_key(&id) => {
                    state.customers.insert(id, json_body.clone());
                    Json(json_body).into_response()
                }
                _ => not_found(),
            }
        }
        (method, ["api", "admin", "customers", id, rest @ ..]) => {
            let Ok(id) = id.parse::<i64>() else {
                return not_found();
            };
            match (method, rest) {
                (Method::GET, []) => state
                    .customers
                    .get(&id)
                    .cloned()
                    .map_or_else(not_found, |c| Json(c).into_response()),
                (Method::DELETE, []) => match state.customers.remove(&id) {
                    Some(_) => StatusCode::NO_CONTENT.into_response(),
                    None => not_found(),
                },
                (Method::PUT, [action @ ("activate" | "deactivate")]) => {
                    match state.customers.get_mut(&id) {
                        Some(customer) => {
                            customer["active"] = (*action == "activate").into();
                            StatusCode::OK.into_response()
                        }
                        None => not_found(),
                    }
                }
                _ => not_found(),
            }
        }
        (Method::POST, ["upload"]) => "uploads/artwork.png".into_response(),
        (Method::POST, ["design", "create"]) => {
            Json(with_id(json_body, "designId", 11)).into_response()
        }
        (Method::POST, ["position", "create"]) => {
            Json(with_id(json_body, "positionId", 21)).into_response()
        }
        (Method::POST, ["rotation", "create"]) => {
            Json(with_id(json_body, "rotationId", 22)).into_response()
        }
        (Method::POST, ["scale", "create"]) => {
            Json(with_id(json_body, "scaleId", 23)).into_response()
        }
        (Method::GET, ["position" | "rotation" | "scale", "getAll"]) => {
            Json(json!([])).into_response()
        }
        (Method::GET, ["tshirt", "getAll"]) => {
            let tshirts: Vec<Value> = state.tshirts.values().cloned().collect();
            Json(tshirts).into_response()
        }
        (Method::POST, ["placement-data", "create"]) => {
            Json(json!({ "placementDataId": 31 })).into_response()
        }
        (Method::POST, ["tshirt", "create"]) => {
            let record = with_id(json_body, "tshirtId", 41);
            state.tshirts.insert(41, record.clone());
            Json(record).into_response()
        }
        (Method::POST, ["api", "payments"]) => {
            Json(with_id(json_body, "paymentId", 1001)).into_response()
        }
        (Method::GET, ["api", "payment-info"]) => Json(json!({
            "accountName": "Teeforge (Pty) Ltd",
            "accountNumber": "62001234567",
            "branchCode": "250655",
            "cryptoAddress": "bc1qteeforge0example"
        }))
        .into_response(),
        _ => not_found(),
    }
}

/// A running storefront wired to a [`MockBackend`].
pub struct TestApp {
    pub address: SocketAddr,
    pub client: reqwest::Client,
    pub backend: MockBackend,
}

/// Configuration pointing at the mock backend. Sessions stay in memory, so
/// the database URL is never used.
#[must_use]
pub fn test_config(backend_addr: SocketAddr) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://unused@localhost/unused"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        backend: BackendConfig {
            base_url: Url::parse(&format!("http://{backend_addr}/")).expect("mock backend url"),
            timeout: Duration::from_secs(10),
        },
        designer: DesignerConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

impl TestApp {
    /// Start a fresh mock backend and storefront.
    pub async fn spawn() -> Self {
        let backend = MockBackend::new();
        let backend_addr = backend.clone().serve().await;
        let config = test_config(backend_addr);

        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let state = AppState::new(config, None).expect("app state");
        let router = teeforge_storefront::app(state, session_layer);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let address = listener.local_addr().expect("storefront address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("storefront");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("http client");

        Self {
            address,
            client,
            backend,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// Submit a form. Redirects are followed, so the response is the page
    /// the shopper lands on.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    pub async fn login(&self, user_name: &str, password: &str) -> reqwest::Response {
        self.post_form(
            "/auth/login",
            &[("user_name", user_name), ("password", password)],
        )
        .await
    }

    /// Sign in as the seeded customer and forget the calls that took.
    pub async fn login_customer(&self) {
        let response = self.login(CUSTOMER, PASSWORD).await;
        assert_eq!(response.url().path(), "/designer");
        self.backend.clear_calls();
    }

    /// Sign in as the seeded administrator and forget the calls that took.
    pub async fn login_admin(&self) {
        let response = self.login(ADMIN, PASSWORD).await;
        assert_eq!(response.url().path(), "/admin/customers");
        self.backend.clear_calls();
    }

    /// Upload `size` bytes as a PNG named `file_name`.
    pub async fn upload_png(&self, file_name: &str, size: usize) -> reqwest::Response {
        let mut bytes = vec![0_u8; size];
        for (slot, byte) in bytes.iter_mut().zip(b"\x89PNG\r\n\x1a\n") {
            *slot = *byte;
        }
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str("image/png")
            .expect("mime");
        let form = reqwest::multipart::Form::new().part("file", part);
        self.client
            .post(self.url("/designer/upload"))
            .multipart(form)
            .send()
            .await
            .expect("upload request")
    }

    /// Fill the cart through the designer: upload, name and save one shirt.
    pub async fn order_one_shirt(&self, name: &str) -> reqwest::Response {
        self.upload_png("art.png", 2048).await;
        self.post_form(
            "/designer/options",
            &[
                ("color", "black"),
                ("size", "L"),
                ("view", "front"),
                ("name", name),
                ("description", ""),
                ("quantity", "1"),
            ],
        )
        .await;
        self.post_form("/designer/save", &[]).await
    }
}
