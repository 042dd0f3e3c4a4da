//! Tracing subscriber setup

use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "mediashim=debug,tower_http=debug";

/// Initialize tracing
///
/// Production emits JSON lines; everything else a compact console format.
/// `RUST_LOG` overrides the default filter.
pub fn init_telemetry(json: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let json_fmt = json.then(|| tracing_subscriber::fmt::layer().json().with_target(true));
    let console_fmt = (!json).then(|| {
        tracing_subscriber::fmt::layer().event_format(Format::default().compact().with_target(false))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_fmt)
        .with(console_fmt)
        .try_init()?;

    Ok(())
}
