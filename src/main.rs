use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use taskpulse::{config::Config, routes, AppState};

fn cors(origin: Option<&str>) -> Cors {
    let cors = match origin {
        Some(origin) => Cors::default().allowed_origin(origin).supports_credentials(),
        None => Cors::default().allow_any_origin(),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        log::error!("configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;
    log::debug!("loaded {:?}", config);

    let state = AppState::init(&config).await.map_err(|e| {
        log::error!("startup failed: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;
    let state = web::Data::new(state);

    log::info!("Starting TaskPulse server at {}", config.server_url());
    let cors_origin = config.cors_origin.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
