use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera_api::{background, AppState, ServerConfig};
use tessera_events::EventBus;
use tessera_genai::{CliImageTool, CliTextGenerator};
use tessera_pipeline::Cascade;
use tessera_scanner::SupervisorCli;
use tessera_store::StateStore;
use tessera_worker::{IconWorker, StartGate};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera=debug,tessera_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- State store ---
    let store = Arc::new(
        StateStore::open(&config.data_dir)
            .await
            .expect("Failed to open state store"),
    );
    tracing::info!(data_dir = %config.data_dir.display(), "State store opened");

    // --- Event bus ---
    let events = Arc::new(EventBus::default());

    // --- Generators + cascade ---
    let (text_program, text_args) = ServerConfig::split_command(&config.text_generator_cmd);
    let text = Arc::new(CliTextGenerator::new(text_program, text_args));
    let image = Arc::new(CliImageTool::new(
        &config.generate_image_bin,
        &config.remove_background_bin,
    ));
    let cascade = Arc::new(Cascade::new(
        store.clone(),
        events.clone(),
        text,
        image,
    ));

    // --- Icon worker (gated until the server is listening) ---
    let (queue, queue_rx) = tessera_worker::channel();
    let gate = Arc::new(StartGate::default());
    let cancel = tokio_util::sync::CancellationToken::new();
    let worker = IconWorker::new(queue.clone(), queue_rx, cascade.clone(), gate.clone());
    let worker_handle = tokio::spawn(worker.run(cancel.clone()));

    // --- Supervisor handle + probe client ---
    let (supervisor_program, supervisor_args) =
        ServerConfig::split_command(&config.supervisor_cmd);
    let supervisor = Arc::new(SupervisorCli::new(
        supervisor_program,
        supervisor_args,
        &config.supervisor_state_path,
        Duration::from_secs(config.scan_timeout_secs),
    ));
    let probe_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.probe_timeout_secs))
        .build()
        .expect("Failed to build HTTP client");

    // --- App state ---
    let state = AppState {
        store,
        queue,
        events,
        cascade,
        supervisor,
        config: Arc::new(config.clone()),
        probe_client,
    };

    // --- Background scanner ---
    let scanner_handle = tokio::spawn(background::run_periodic(state.clone(), cancel.clone()));

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = tessera_api::app(state)
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(cors);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Open the gate only once we are actually serving, so queued icon
    // work never delays startup.
    gate.open();
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), scanner_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), worker_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// No configured origins means a permissive layer, which is the right
/// default for a dashboard bound to localhost. Panics at startup if a
/// configured origin is invalid; misconfiguration should fail fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
