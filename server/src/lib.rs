//! The jirai minesweeper server.
//!
//! Clients pick a field from the catalog, open a session on it and touch
//! cells until they hit a mine or clear the board. The session engine lives
//! in [`data`] and [`logic`]; everything else wires it to HTTP.

use std::sync::Arc;

use rocket::{Build, Rocket, catchers, routes};
use tracing::info;

pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod cors;
pub mod data;
pub mod error;
pub mod logic;
pub mod routes;
pub mod service;

use crate::{
    cleanup::SweeperFairing,
    config::Config,
    cors::create_cors,
    error::Error,
    logic::SessionRegistry,
    routes::{
        create_session, default_catcher, delete_session, get_field, get_session, list_fields,
        touch_session,
    },
    service::GameService,
};

/// Assembles the server from `config`.
///
/// Fails with [`Error::Unavailable`] when the field catalog or CORS setup
/// cannot be built; callers should treat that as fatal.
pub fn build(config: &Config) -> Result<Rocket<Build>, Error> {
    config.validate()?;

    let catalog = catalog::from_config(&config.datasource)?;
    let registry = Arc::new(SessionRegistry::new(
        config.sessions.capacity,
        config.sessions.ttl(),
    ));
    let service = GameService::new(catalog, registry);

    let cors = create_cors(&config.cors)
        .map_err(|e| Error::unavailable(format!("invalid CORS configuration: {e}")))?;

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address))
        .merge(("port", config.server.port));

    info!(
        "Configured for {}:{}, at most {} sessions",
        config.server.address, config.server.port, config.sessions.capacity
    );

    Ok(rocket::custom(figment)
        .attach(cors)
        .attach(SweeperFairing::new(config.sessions.sweep_interval()))
        .manage(service)
        .mount(
            "/",
            routes![
                list_fields,
                get_field,
                create_session,
                get_session,
                touch_session,
                delete_session
            ],
        )
        .register("/", catchers![default_catcher]))
}
