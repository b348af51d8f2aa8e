use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the trace filter, e.g. `RLEBF_LOG=rle_bf=debug`.
pub const LOG_ENV: &str = "RLEBF_LOG";

/// Install a stderr subscriber when `RLEBF_LOG` is set.
///
/// Without it nothing is logged, so stdout carries only program output and
/// stderr only diagnostics.
pub fn init() {
    let Ok(directives) = std::env::var(LOG_ENV) else {
        return;
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .try_init();
}
