use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Checked before `RUST_LOG`.
const LOG_ENV: &str = "LOOPLOAD_LOG";

pub fn init_logging(verbose: bool, no_color: bool) {
    let directive = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(directive.as_deref(), verbose))
        .with_ansi(!no_color)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// An explicit directive wins; `-v` only raises the default level.
fn log_filter(directive: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    directive.map_or_else(
        || EnvFilter::new(fallback),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(fallback)),
    )
}
