#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use serde_json::Value;
use uuid::Uuid;

use taskpulse::auth::TokenService;
use taskpulse::models::NewUser;
use taskpulse::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Builds the same app `main` serves, backed by the in-memory store.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(taskpulse::routes::health::health)
                .service(actix_web::web::scope("/api").configure(taskpulse::routes::config)),
        )
        .await
    };
}
pub(crate) use init_app;

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::in_memory(TokenService::new(TEST_SECRET)))
}

/// Inserts a user straight into the store and returns its id and a valid token.
pub async fn seed_user(state: &AppState, email: &str) -> (Uuid, String) {
    let user = state
        .users
        .create(NewUser {
            name: "Seeded".to_string(),
            email: email.to_string(),
            password_hash: "not-used-by-these-tests".to_string(),
        })
        .await
        .expect("seed user");
    let token = state.tokens.issue(user.id).expect("issue token");
    (user.id, token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Sends a request and returns its status and JSON body (`Null` when empty).
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
