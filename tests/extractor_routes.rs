// tests/extractor_routes.rs
//
// The `Negotiate` extractor inside a routed Axum app: negotiated responses,
// request body reading and the HTTP statuses of each failure.

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use conneg::{ClassContract, HttpError, Negotiate, NegotiationConfig, Object, PropertyNaming, Value};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

// ── Helpers ─────────────────────────────────────────────────

fn user(id: i64, email: &str) -> Value {
    Value::Object(
        Object::new("User")
            .with_field("id", id)
            .with_field("email_address", email)
            .into_ref(),
    )
}

async fn show_user(negotiate: Negotiate) -> Result<Response, HttpError> {
    negotiate.respond(StatusCode::OK, user(123, "foo@bar.com"))
}

async fn greet(negotiate: Negotiate) -> Result<Response, HttpError> {
    negotiate.respond(StatusCode::OK, "hello")
}

async fn create_user(negotiate: Negotiate, body: Bytes) -> Result<Response, HttpError> {
    let created = negotiate.read_body_as("User", &body)?;
    negotiate.respond(StatusCode::CREATED, created)
}

fn app() -> Router {
    let negotiation = NegotiationConfig::default()
        .supported_languages(["en-US", "fr"])
        .property_naming(PropertyNaming::CamelCase)
        .build([ClassContract::promoted(
            "User",
            &[("id", "int"), ("email_address", "string")],
        )]);

    Router::new()
        .route("/users/1", get(show_user))
        .route("/greeting", get(greet))
        .route("/users", post(create_user))
        .with_state(negotiation)
}

async fn send(request: Request<Body>) -> Response {
    app().oneshot(request).await.unwrap()
}

fn get_header(response: &Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════

#[tokio::test]
async fn objects_default_to_json_without_accept() {
    let response = send(Request::get("/users/1").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_header(&response, header::CONTENT_TYPE).as_deref(), Some("application/json"));
    assert_eq!(
        body_string(response).await,
        r#"{"id":123,"emailAddress":"foo@bar.com"}"#
    );
}

#[tokio::test]
async fn accept_language_sets_content_language() {
    let request = Request::get("/users/1")
        .header(header::ACCEPT, "application/problem+json")
        .header(header::ACCEPT_LANGUAGE, "fr-CA, en;q=0.5")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(
        get_header(&response, header::CONTENT_TYPE).as_deref(),
        Some("application/problem+json")
    );
    assert_eq!(get_header(&response, header::CONTENT_LANGUAGE).as_deref(), Some("fr"));
}

#[tokio::test]
async fn unacceptable_requests_get_406_with_alternatives() {
    let request = Request::get("/users/1")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    let listed: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        listed,
        [
            "application/json",
            "text/json",
            "application/problem+json",
            "application/x-www-form-urlencoded"
        ]
    );
}

#[tokio::test]
async fn malformed_accept_is_400() {
    let request = Request::get("/users/1")
        .header(header::ACCEPT, "/html")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(request).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn strings_are_sent_as_is() {
    let request = Request::get("/greeting")
        .header(header::ACCEPT, "image/png")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "hello");
}

// ════════════════════════════════════════════════════════════
// Request bodies
// ════════════════════════════════════════════════════════════

#[tokio::test]
async fn json_bodies_are_decoded_and_echoed() {
    let request = Request::post("/users")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(r#"{"ID": "7", "emailAddress": "a@b.c"}"#))
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_string(response).await, r#"{"id":7,"emailAddress":"a@b.c"}"#);
}

#[tokio::test]
async fn form_bodies_are_decoded() {
    let request = Request::post("/users")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, "application/x-www-form-urlencoded")
        .body(Body::from("id=9&email_address=c%40d.e"))
        .unwrap();
    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_string(response).await, "id=9&emailAddress=c%40d.e");
}

#[tokio::test]
async fn unsupported_content_type_is_415() {
    let request = Request::post("/users")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from("7,a@b.c"))
        .unwrap();
    assert_eq!(send(request).await.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn missing_content_type_with_a_body_is_415() {
    let request = Request::post("/users").body(Body::from("{}")).unwrap();
    assert_eq!(send(request).await.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn undecodable_bodies_are_422() {
    let request = Request::post("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"id": 7}"#))
        .unwrap();
    assert_eq!(send(request).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
