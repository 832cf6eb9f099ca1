// ── Tracing setup ──
//
// Library code only emits `tracing` events. Hosts that want them on stderr
// call one of these once at startup.

use tracing_subscriber::EnvFilter;

fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)))
}

/// Install a stderr fmt subscriber. `RUST_LOG` overrides `verbosity`.
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Like [`init_tracing`], but reports an existing subscriber as an error.
pub fn try_init_tracing(
    verbosity: u8,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
