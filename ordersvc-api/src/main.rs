use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ordersvc_api::{app, telemetry, AppState};
use ordersvc_catalog::{Catalog, RandomSelector};
use ordersvc_core::ErrorReporter;
use ordersvc_order::{EventPublisher, HttpPaymentGateway, OrderOrchestrator};
use ordersvc_store::{ApmErrorReporter, Config, EventProducer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    telemetry::init_tracing(config.log_level()?, config.telemetry.log_format)
        .context("Failed to init logging")?;

    let service_span = telemetry::service_span(&config.telemetry);
    info!(parent: &service_span, "Starting server...");

    let reporter = ApmErrorReporter::new(
        config.telemetry.apm_url.as_deref(),
        &config.telemetry.service_name,
        &config.telemetry.environment,
    )
    .context("Failed to build error reporter")?;
    let reporter: Arc<dyn ErrorReporter> = Arc::new(reporter);

    let gateway = HttpPaymentGateway::new(
        &config.payment.url,
        Duration::from_millis(config.payment.timeout_ms),
        reporter,
    )
    .context("Failed to build payment client")?;

    // Kafka Connection
    let producer = EventProducer::new(
        &config.kafka.brokers,
        &config.kafka.topic,
        config.kafka.message_timeout_ms,
    )
    .context("Failed to create Kafka producer")?;
    let producer = Arc::new(producer);

    let orchestrator = OrderOrchestrator::new(
        Catalog::with_default_orders(),
        Arc::new(RandomSelector::new()),
        Arc::new(gateway),
        EventPublisher::new(producer.clone()),
    );

    let state = AppState::new(Arc::new(orchestrator)).with_service_span(service_span.clone());
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(parent: &service_span, "Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    info!(parent: &service_span, "Flushing pending events to {}", producer.topic());
    if let Err(e) = producer.flush(Duration::from_secs(5)) {
        warn!(parent: &service_span, "Failed to flush Kafka producer: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
