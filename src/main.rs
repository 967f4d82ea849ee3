use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tastesync::config::{LoggingSettings, Settings};
use tastesync::core::{TasteEncoder, EMBEDDING_DIM};
use tastesync::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use tastesync::routes::{self, AppState};
use tastesync::services::{
    CacheManager, InMemoryVectorIndex, JwtKeys, MatchingOptions, PineconeIndex, PostgresClient, TwinMatchingService,
    VectorIndex, YelpAiClient, YelpClient,
};

const DEFAULT_L1_SIZE: u64 = 10_000;

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&settings.logging);
    info!("Starting TasteSync API v{}", env!("CARGO_PKG_VERSION"));

    let postgres = Arc::new(
        PostgresClient::from_settings(&settings.database)
            .await
            .map_err(|e| io_error("PostgreSQL connection error", e))?,
    );
    info!("PostgreSQL connected and migrations applied");

    let l1_size = settings.cache.l1_cache_size.unwrap_or(DEFAULT_L1_SIZE);
    let cache_ttl = settings.cache.twins_ttl_secs;
    let cache = match CacheManager::new(&settings.cache.redis_url, l1_size, cache_ttl).await {
        Ok(c) => {
            info!("Cache manager initialized (L1: {} entries, Redis enabled)", l1_size);
            Arc::new(c)
        }
        Err(e) => {
            warn!("Redis unavailable ({}), running with in-process cache only", e);
            Arc::new(CacheManager::in_memory(l1_size, cache_ttl))
        }
    };

    let index: Arc<dyn VectorIndex> = if settings.pinecone.is_configured() {
        let pinecone =
            PineconeIndex::from_settings(&settings.pinecone).map_err(|e| io_error("Pinecone client error", e))?;
        info!("Using Pinecone index namespace {}", settings.pinecone.namespace);
        Arc::new(pinecone)
    } else {
        warn!("Pinecone not configured, using in-process vector index");
        Arc::new(InMemoryVectorIndex::new(EMBEDDING_DIM))
    };

    let encoder = Arc::new(TasteEncoder::new(settings.matching.encoder_seed));

    let timeout = Duration::from_secs(settings.yelp.timeout_secs);
    let yelp = YelpClient::new(settings.yelp.base_url.clone(), settings.yelp.api_key.clone(), timeout)
        .map_err(|e| io_error("Yelp client error", e))?
        .with_cache(cache.clone(), Duration::from_secs(settings.cache.restaurant_ttl_secs));
    let yelp_ai = YelpAiClient::new(settings.yelp.ai_chat_url.clone(), settings.yelp.api_key.clone(), timeout)
        .map_err(|e| io_error("Yelp AI client error", e))?;
    if settings.yelp.api_key.is_empty() {
        warn!("YELP_API_KEY is not set; restaurant endpoints will fail upstream");
    }

    let twins = TwinMatchingService::new(
        postgres.clone(),
        cache.clone(),
        index,
        encoder,
        MatchingOptions::from_settings(&settings),
    );

    let app_state = AppState {
        postgres,
        cache,
        yelp: Arc::new(yelp),
        yelp_ai: Arc::new(yelp_ai),
        twins: Arc::new(twins),
        jwt: Arc::new(JwtKeys::from_settings(&settings.auth)),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let origins = settings.cors.origins();

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = if origins.is_empty() {
            Cors::permissive()
        } else {
            origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600)
        };

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
