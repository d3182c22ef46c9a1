//! Shared harness: a stateful in-memory Airtable behind wiremock and helpers
//! for driving the router without a socket.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use folio_backend::{create_router, AppConfig, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{matchers::path_regex, Mock, MockServer, Respond, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const BASE_ID: &str = "appTest";
pub const TABLE: &str = "Testimonials";
pub const ADMIN_TOKEN: &str = "admin-secret";

/// Keeps rows the way the hosted table would and answers list, create,
/// update and delete calls against them.
#[derive(Clone, Default)]
pub struct FakeAirtable {
    rows: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicU32>,
}

impl FakeAirtable {
    pub fn seed(&self, id: &str, created_time: &str, fields: Value) {
        self.rows.lock().expect("rows lock").push(json!({
            "id": id,
            "createdTime": created_time,
            "fields": fields,
        }));
    }

    pub fn rows(&self) -> Vec<Value> {
        self.rows.lock().expect("rows lock").clone()
    }

    pub fn fields(&self, id: &str) -> Option<Value> {
        self.rows()
            .into_iter()
            .find(|row| row["id"] == id)
            .map(|row| row["fields"].clone())
    }

    fn not_found() -> ResponseTemplate {
        ResponseTemplate::new(404).set_body_json(json!({ "error": "NOT_FOUND" }))
    }
}

impl Respond for FakeAirtable {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let expected_auth = format!("Bearer {API_KEY}");
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == expected_auth);
        if !authorized {
            return ResponseTemplate::new(401)
                .set_body_json(json!({ "error": "AUTHENTICATION_REQUIRED" }));
        }

        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|segments| segments.map(ToOwned::to_owned).collect())
            .unwrap_or_default();
        let record_id = match segments.as_slice() {
            [_, base, table] if base == BASE_ID && table == TABLE => None,
            [_, base, table, id] if base == BASE_ID && table == TABLE => Some(id.clone()),
            _ => return Self::not_found(),
        };
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let mut rows = self.rows.lock().expect("rows lock");

        match (request.method.as_str(), record_id) {
            ("GET", None) => {
                let limit = request
                    .url
                    .query_pairs()
                    .find(|(key, _)| key == "maxRecords")
                    .and_then(|(_, value)| value.parse::<usize>().ok())
                    .unwrap_or(usize::MAX);
                let records: Vec<Value> = rows.iter().take(limit).cloned().collect();
                ResponseTemplate::new(200).set_body_json(json!({ "records": records }))
            },
            ("POST", None) => {
                let number = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let row = json!({
                    "id": format!("rec{number:04}"),
                    "createdTime": "2024-06-01T12:00:00.000Z",
                    "fields": body["fields"].clone(),
                });
                rows.push(row.clone());
                ResponseTemplate::new(200).set_body_json(row)
            },
            ("PATCH", Some(id)) => {
                let Some(row) = rows.iter_mut().find(|row| row["id"] == id.as_str()) else {
                    return Self::not_found();
                };
                if let (Some(target), Some(patch)) =
                    (row["fields"].as_object_mut(), body["fields"].as_object())
                {
                    for (key, value) in patch {
                        target.insert(key.clone(), value.clone());
                    }
                }
                ResponseTemplate::new(200).set_body_json(row.clone())
            },
            ("DELETE", Some(id)) => {
                let before = rows.len();
                rows.retain(|row| row["id"] != id.as_str());
                if rows.len() == before {
                    return Self::not_found();
                }
                ResponseTemplate::new(200).set_body_json(json!({ "id": id, "deleted": true }))
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub airtable: FakeAirtable,
    pub server: MockServer,
}

/// App backed by a working fake table. `extra` adds or overrides env values.
pub async fn spawn_app(extra: &[(&str, &str)]) -> TestApp {
    let server = MockServer::start().await;
    let airtable = FakeAirtable::default();
    Mock::given(path_regex(r"^/v0/.*"))
        .respond_with(airtable.clone())
        .mount(&server)
        .await;
    let router = router_for(&server, extra);
    TestApp {
        router,
        airtable,
        server,
    }
}

/// App whose table answers every call with `503`.
pub async fn spawn_failing_app(extra: &[(&str, &str)]) -> TestApp {
    let server = MockServer::start().await;
    Mock::given(path_regex(r"^/v0/.*"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
        .mount(&server)
        .await;
    let router = router_for(&server, extra);
    TestApp {
        router,
        airtable: FakeAirtable::default(),
        server,
    }
}

fn router_for(server: &MockServer, extra: &[(&str, &str)]) -> Router {
    let mut env: HashMap<String, String> = HashMap::from([
        ("AIRTABLE_API_BASE".to_string(), format!("{}/v0", server.uri())),
        ("AIRTABLE_BASE_ID".to_string(), BASE_ID.to_string()),
        ("AIRTABLE_API_KEY".to_string(), API_KEY.to_string()),
        ("ADMIN_TOKEN".to_string(), ADMIN_TOKEN.to_string()),
    ]);
    for (key, value) in extra {
        env.insert(key.to_string(), value.to_string());
    }
    let config = AppConfig::from_lookup(|key| env.get(key).cloned()).expect("test config");
    create_router(AppState::new(config).expect("test state"))
}

pub fn functions_path(endpoint: &str) -> String {
    format!("/.netlify/functions/{endpoint}")
}

pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.10");
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };
    request.expect("request")
}

pub fn admin_request(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut request = request(method, uri, body);
    request.headers_mut().insert(
        "authorization",
        format!("Bearer {token}").parse().expect("header value"),
    );
    request
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn valid_submission() -> Value {
    json!({
        "name": "Al",
        "email": "a@b.com",
        "company": "Acme",
        "message": "Great work, highly recommend!",
        "rating": 5
    })
}

pub fn approved_fields(name: &str, message: &str, rating: f64, approved_at: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "company": "Initech",
        "message": message,
        "rating": rating,
        "approvedAt": approved_at,
    })
}

pub fn pending_fields(name: &str, message: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "company": "Globex",
        "message": message,
        "rating": 4,
    })
}
