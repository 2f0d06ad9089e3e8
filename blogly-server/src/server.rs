use actix_web::http::StatusCode;
use actix_web::middleware::{DefaultHeaders, ErrorHandlers};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::application::post_service::PostService;
use crate::application::tag_service::TagService;
use crate::application::user_service::UserService;
use crate::data::Repositories;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::templates::Templates;
use crate::presentation::handlers;
use crate::presentation::middleware::RequestContext;
use crate::presentation::pages;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub posts: PostService,
    pub tags: TagService,
    pub templates: Templates,
}

impl AppState {
    pub fn new(repos: &Repositories, templates: Templates) -> Self {
        Self {
            users: UserService::new(repos),
            posts: PostService::new(repos),
            tags: TagService::new(repos),
            templates,
        }
    }
}

/// Routes plus the 404 page, without the logging and header middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .configure(handlers::configure);
}

pub fn error_pages<B: actix_web::body::MessageBody + 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::NOT_FOUND, pages::not_found)
}

pub async fn start_server(config: AppConfig, repos: Repositories) -> anyhow::Result<()> {
    let templates = Templates::new()?;
    let state = web::Data::new(AppState::new(&repos, templates));
    let bind_address = (config.host.clone(), config.port);

    info!(host = %bind_address.0, port = bind_address.1, "HTTP server starting");

    HttpServer::new(move || {
        App::new()
            .wrap(error_pages())
            .wrap(RequestContext)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
