pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers `/auth` and the guarded `/tasks` scope.
///
/// Extractor failures are routed through `AppError` so every error body has the
/// same `{success, error}` shape.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::dashboard_stats)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationFailed(format!("Invalid request body: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationFailed(format!("Invalid query parameters: {}", err)).into()
    })
}

// A path id that is not a UUID cannot name one of the caller's tasks.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| AppError::task_not_found().into())
}
