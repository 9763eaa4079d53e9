use crate::{
    auth::{
        hash_password, normalize_email, verify_password, AuthData, AuthResponse, LoginRequest,
        RegisterRequest,
    },
    error::AppError,
    models::NewUser,
    repository::email_in_use,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

const BAD_CREDENTIALS: &str = "Login failed. Email or password is incorrect.";

// Runs bcrypt on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?
}

/// Register a new user
///
/// Creates a new user account and returns it together with a session token.
///
/// ## Responses:
/// - `201 Created`: `{success, message, data: {user, token}}`.
/// - `400 Bad Request`: missing or invalid name, email or password.
/// - `409 Conflict`: the email is already registered.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let request = register_data.into_inner();
    request.validate()?;

    let email = normalize_email(&request.email);
    if state.users.find_by_email(&email).await?.is_some() {
        log::info!("registration refused: email already in use");
        return Err(email_in_use());
    }

    let password = request.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = state
        .users
        .create(NewUser {
            name: request.name.trim().to_string(),
            email,
            password_hash,
        })
        .await?;

    let token = state.tokens.issue(user.id)?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse::ok(
        "User registration successful.",
        AuthData {
            user: user.profile(),
            token,
        },
    )))
}

/// Login user
///
/// Checks the credentials and returns the user together with a fresh session token.
/// An unknown email and a wrong password produce the same `401`.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let request = login_data.into_inner();
    request.validate()?;

    let user = state
        .users
        .find_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(|| AppError::Unauthenticated(BAD_CREDENTIALS.into()))?;

    let password = request.password;
    let stored_hash = user.password_hash.clone();
    let matches = blocking(move || verify_password(&password, &stored_hash)).await?;
    if !matches {
        log::warn!("failed login for user {}", user.id);
        return Err(AppError::Unauthenticated(BAD_CREDENTIALS.into()));
    }

    let token = state.tokens.issue(user.id)?;
    log::info!("user {} logged in", user.id);

    Ok(HttpResponse::Ok().json(AuthResponse::ok(
        "Login successful.",
        AuthData {
            user: user.profile(),
            token,
        },
    )))
}
