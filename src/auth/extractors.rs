use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::UserProfile;

/// The caller resolved by [`AuthMiddleware`](super::AuthMiddleware).
///
/// This is the only source of the user id used to scope task operations; ids sent
/// by the client in bodies or query strings are never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserProfile);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                // Reached only when a handler is mounted outside the guarded scope.
                let err = AppError::Unauthenticated("Access denied. No token provided.".into());
                ready(Err(err.into()))
            }
        }
    }
}
