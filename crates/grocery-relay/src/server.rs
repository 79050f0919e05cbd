//! Actix Web HTTP server.
//!
//! Endpoints:
//! - `POST /api/claude`
//! - `GET /` (the organizer page)

use crate::{
    config::RelayConfig,
    error::RelayError,
    relay,
    upstream::{AnthropicTransport, MessagesTransport},
};
use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::{header::ContentType, StatusCode},
    middleware, web, App, HttpResponse, HttpServer,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct AppState {
    pub transport: Arc<dyn MessagesTransport>,
    pub static_page: PathBuf,
}

impl AppState {
    pub fn new(transport: Arc<dyn MessagesTransport>, static_page: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            static_page: static_page.into(),
        }
    }
}

pub async fn serve(config: RelayConfig) -> Result<()> {
    let addr = config.bind_addr();
    let transport = AnthropicTransport::from_config(&config)?;
    info!(addr = %addr, upstream = %transport.url(), "grocery-relay listening");

    let state = web::Data::new(AppState::new(
        Arc::new(transport),
        config.static_page.clone(),
    ));
    let max_body_bytes = config.max_body_bytes;

    HttpServer::new(move || app(state.clone(), max_body_bytes))
        .bind(&addr)
        .with_context(|| format!("failed to bind {}", addr))?
        .run()
        .await
        .context("server error")?;

    Ok(())
}

/// The full application: state, body limit, CORS, access log and routes.
pub fn app(
    state: web::Data<AppState>,
    max_body_bytes: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::PayloadConfig::new(max_body_bytes))
        .wrap(Cors::permissive())
        .wrap(middleware::Logger::default())
        .configure(routes)
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/api/claude").route(web::post().to(handle_claude)));
}

async fn index(state: web::Data<AppState>) -> HttpResponse {
    match tokio::fs::read(&state.static_page).await {
        Ok(page) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(page),
        Err(e) => {
            warn!(path = %state.static_page.display(), error = %e, "static page unavailable");
            HttpResponse::NotFound().finish()
        }
    }
}

/// The body is taken as raw bytes: a body that is not a JSON object must
/// surface as a relay error (500), not as actix's own 400.
async fn handle_claude(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, RelayError> {
    let reply = match relay::handle(state.transport.as_ref(), &body).await {
        Ok(reply) => reply,
        Err(e) if e.is_validation() => {
            warn!(error = %e, "rejected request");
            return Err(e);
        }
        Err(e) => {
            error!(error = %e, "relay failed");
            return Err(e);
        }
    };

    let status =
        StatusCode::from_u16(reply.status).map_err(|_| RelayError::InvalidStatus(reply.status))?;
    Ok(HttpResponse::build(status).json(reply.body))
}
