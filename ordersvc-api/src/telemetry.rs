use ordersvc_store::app_config::{LogFormat, TelemetryConfig};
use tracing::level_filters::LevelFilter;
use tracing::{Level, Span};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: Level, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},tower_http=debug,axum::rejection=trace",
            LevelFilter::from_level(level)
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(true))
            .try_init()?,
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init()?,
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init()?,
    }

    Ok(())
}

/// Root span naming the service and deployment environment.
pub fn service_span(config: &TelemetryConfig) -> Span {
    tracing::info_span!(
        "service",
        app = %config.service_name,
        env = %config.environment,
    )
}
