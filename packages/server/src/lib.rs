#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the agricultural supply-chain compliance
//! service.
//!
//! Exposes `POST /check` (the fanned-out compliance evaluation), read-only
//! registry introspection (`GET /sources[/{category}]`), reference
//! fixtures for integration tests (`GET /samples/{checkerName}`), and a
//! reachability/freshness monitor (`GET /health`).
//!
//! Unlike the pre-generated-file serving this crate's ancestor did, every
//! endpoint here reads live from a `PostGIS`-backed `Arc<dyn Database>`
//! connection opened at startup; there is no lazy file-watcher step.

mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use defarm_checker::CheckerRegistry;
use defarm_orchestrator::Orchestrator;
use include_dir::{Dir, include_dir};
use switchy_database::Database;

/// Embedded seeded example fixtures, one per checker, for `GET
/// /samples/{checkerName}`.
static SAMPLES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../demos/samples");

/// Checker names, for resolving `CHECKER_<NAME>_ENABLED`/`_TIMEOUT_MS`
/// overrides at startup. Kept in sync with `registry::build_registry`.
const KNOWN_CHECKER_NAMES: &[&str] = &[
    "labor_blacklist",
    "environmental_embargoes",
    "sanctions",
    "indigenous_land",
    "conservation_unit",
    "annual_deforestation",
    "deforestation_alert",
    "validated_deforestation",
    "fire_hotspot",
    "water_permit",
    "rural_property",
    "car_deforestation_intersection",
    "embargo_proximity",
];

/// Shared application state.
pub struct AppState {
    /// Relational store, shared process-wide.
    pub db: Arc<dyn Database>,
    /// Compliance check orchestrator.
    pub orchestrator: Arc<Orchestrator>,
    /// Checker registry, for `/sources` introspection.
    pub registry: Arc<CheckerRegistry>,
    /// Embedded per-checker sample fixtures, keyed by checker name.
    pub samples: HashMap<String, String>,
    /// `API_VERSION`, surfaced in every check response's metadata.
    pub api_version: String,
}

/// Loads every `demos/samples/<name>.toml` fixture embedded at compile
/// time, keyed by file stem.
#[must_use]
pub fn load_samples() -> HashMap<String, String> {
    SAMPLES_DIR
        .files()
        .filter_map(|file| {
            let name = file.path().file_stem()?.to_str()?.to_string();
            let contents = file.contents_utf8()?.to_string();
            Some((name, contents))
        })
        .collect()
}

/// Starts the compliance API server.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let db: Arc<dyn Database> = match defarm_database::db::connect_from_env().await {
        Ok(db) => Arc::from(db),
        Err(err) => {
            log::error!("failed to connect to database: {err}");
            return Err(std::io::Error::other(err.to_string()));
        }
    };

    if let Err(err) = defarm_database::run_migrations(db.as_ref()).await {
        log::error!("failed to run database migrations: {err}");
        return Err(std::io::Error::other(err.to_string()));
    }

    let registry_config = defarm_checker::registry::RegistryConfig::from_env(KNOWN_CHECKER_NAMES);
    let registry = Arc::new(defarm_checker::registry::build_registry(&registry_config));

    let geocoder_config = defarm_geocoder::GeocoderConfig::from_env();
    let geocode_cache = Arc::new(defarm_cache::RelationalGeocodeCache::new(Arc::clone(&db)));
    let geocoder = Arc::new(defarm_geocoder::Geocoder::new(geocoder_config).with_cache(geocode_cache));

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&db),
        Arc::clone(&registry),
        geocoder,
    ));

    let api_version = std::env::var("API_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());
    let samples = load_samples();

    let state = web::Data::new(AppState {
        db,
        orchestrator,
        registry,
        samples,
        api_version,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/check", web::post().to(handlers::check))
            .route("/sources", web::get().to(handlers::sources))
            .route("/sources/{category}", web::get().to(handlers::sources_by_category))
            .route("/samples/{checker_name}", web::get().to(handlers::sample))
            .route("/health", web::get().to(handlers::health))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
