// demos/negotiation.rs
//
// A small API whose responses follow the client's Accept headers.
//
//   curl localhost:3000/users/1
//   curl -H 'Accept: application/x-www-form-urlencoded' localhost:3000/users/1
//   curl -H 'Accept: text/html' localhost:3000/users/1            # 406
//   curl -H 'Content-Type: application/json' -d '{"id":2,"email":"b@x.io","tags":["new"]}' localhost:3000/users

use axum::{
    body::Bytes,
    response::Response,
    routing::{get, post},
    Router,
};
use conneg::encoding::{ClassContract, ConstructorParameter, PropertyContract};
use conneg::{HttpError, Negotiate, NegotiationConfig, Object, PropertyNaming, StatusCode, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn user_contract() -> ClassContract {
    ClassContract::new("User")
        .parameter(ConstructorParameter::new("id").typed("int"))
        .parameter(ConstructorParameter::new("email").typed("string"))
        .parameter(ConstructorParameter::new("tags").typed("string").variadic())
        .property(PropertyContract::public("display_name").typed("?string"))
}

async fn show_user(negotiate: Negotiate) -> Result<Response, HttpError> {
    let user = Object::new("User")
        .with_field("id", 1)
        .with_field("email", "ada@example.com")
        .with_field("tags", vec!["admin"])
        .with_field("display_name", "Ada")
        .into_ref();
    negotiate.respond(StatusCode::OK, user)
}

async fn create_user(negotiate: Negotiate, body: Bytes) -> Result<Response, HttpError> {
    let user = negotiate.read_body_as("User", &body)?;
    tracing::info!(?user, "user created");
    negotiate.respond(StatusCode::CREATED, user)
}

async fn health(negotiate: Negotiate) -> Result<Response, HttpError> {
    negotiate.respond(StatusCode::OK, Value::from("ok"))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,conneg=debug"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let negotiation = NegotiationConfig::default()
        .supported_languages(["en-US", "en", "de"])
        .property_naming(PropertyNaming::CamelCase)
        .build([user_contract()]);

    let app = Router::new()
        .route("/users/1", get(show_user))
        .route("/users", post(create_user))
        .route("/health", get(health))
        .with_state(negotiation);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("listening on http://127.0.0.1:3000");
    axum::serve(listener, app).await
}
