//! main file for the server

mod controller;
mod document;
pub mod engine;
mod handoff;
pub mod model;
mod scheduler;
mod state;
pub mod util;
pub mod validation;

use actix_web::{error, middleware::Logger, web, App, HttpServer};
use log::{info, warn};
use tokio_util::sync::CancellationToken;
use crate::server::controller::error::CustomError;
use crate::server::controller::{handoff as handoff_routes, invoice};
use crate::server::handoff::HandoffStore;
use crate::server::model::config::ServerConfig;
use crate::server::scheduler::job::{handoff_sweeper, SWEEP_INTERVAL};
use crate::server::state::AppState;

/// invoices are small, anything above this is not a form submission
const JSON_LIMIT_BYTES: usize = 256 * 1024;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            warn!("rejected invoice payload, {}", err);
            error::Error::from(CustomError::BadRequest)
        })
}

/// Routes and extractor config, shared by the server and the tests
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(invoice::get_draft)
        .service(invoice::post_validate)
        .service(invoice::post_totals)
        .service(invoice::generate_pdf)
        .service(handoff_routes::post_handoff)
        .service(handoff_routes::get_handoff_pdf);
}

/// Run the server
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let store = HandoffStore::new(config.handoff_ttl);
    let state = web::Data::new(AppState::new(&config, store.clone()));

    let cancel_token = CancellationToken::new();
    let sweeper = actix_web::rt::spawn(handoff_sweeper(store, SWEEP_INTERVAL, cancel_token.clone()));

    info!("listening on {}", config.addr);
    let result = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
        .bind(config.addr)?
        .run()
        .await;

    cancel_token.cancel();
    if let Err(e) = sweeper.await {
        warn!("hand-off sweeper ended abnormally, {}", e);
    }
    result
}
