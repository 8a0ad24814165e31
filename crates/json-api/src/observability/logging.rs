//! Tracing subscriber for the salon API.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{ServerConfig, observability::LogFormat};

use super::ObservabilityError;

/// Dependencies that are noisy at `info`; the provider client and SQL layer
/// only surface warnings unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: [&str; 6] = ["sqlx", "reqwest", "hyper", "h2", "tonic", "opentelemetry"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.logging.log_level)));

    let subscriber = tracing_subscriber::registry()
        .with(format_layer(config.logging.log_format))
        .with(filter);

    match tracer_provider {
        Some(provider) => {
            let tracer = provider.tracer(config.observability.otel_service_name.clone());

            subscriber
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
        }
        None => subscriber.try_init()?,
    }

    Ok(())
}

fn format_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    }
}

fn default_directives(level: &str) -> String {
    QUIET_TARGETS
        .iter()
        .fold(level.to_string(), |directives, target| {
            format!("{directives},{target}=warn")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_keep_dependencies_quiet() {
        let directives = default_directives("debug");

        assert!(directives.starts_with("debug,"), "got {directives}");
        assert!(directives.contains("sqlx=warn"), "got {directives}");
        assert!(directives.contains("reqwest=warn"), "got {directives}");
    }

    #[test]
    fn default_directives_parse() {
        assert!(
            EnvFilter::try_new(default_directives("info")).is_ok(),
            "default directives must be a valid filter"
        );
    }
}
