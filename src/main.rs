use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cooling_system_bridge::{
    api::{self, AppState},
    command_cache::LastCommandCache,
    config::Config,
    control::CommandDispatcher,
    db::{self, PgControlCommandRepository, PgSensorReadingRepository},
    mqtt::{self, MqttCommandPublisher},
    sensors::TelemetryIngest,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent, env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Connect to DB and run migrations
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database ready");

    let readings = Arc::new(PgSensorReadingRepository::new(pool.clone()));
    let commands = Arc::new(PgControlCommandRepository::new(pool));

    // MQTT event loop feeds a bounded queue drained by the ingest worker
    let (client, eventloop) = mqtt::connect(&config);
    info!(
        broker = %config.mqtt_broker,
        client_id = %config.mqtt_client_id,
        "MQTT client configured"
    );

    // Cancelled on SIGINT/SIGTERM; stops both the HTTP server and the MQTT loop
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let (queue_tx, queue_rx) = mpsc::channel(config.ingest_queue_capacity);
    let ingest_task = tokio::spawn(TelemetryIngest::new(readings.clone()).run(queue_rx));
    let mqtt_task = tokio::spawn(mqtt::run_event_loop(
        client.clone(),
        eventloop,
        queue_tx,
        shutdown.clone(),
    ));

    let last_command = LastCommandCache::new();
    let dispatcher = CommandDispatcher::new(
        Arc::new(MqttCommandPublisher::new(client)),
        commands.clone(),
        last_command.clone(),
    );

    let state = AppState {
        readings,
        commands,
        dispatcher: Arc::new(dispatcher),
        last_command,
    };

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    // The MQTT loop sends DISCONNECT and exits; dropping its queue sender
    // lets the ingest worker drain and stop.
    shutdown.cancel();
    let _ = mqtt_task.await;
    let _ = ingest_task.await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
