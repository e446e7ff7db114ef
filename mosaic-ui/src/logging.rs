//! Tracing setup for mosaic hosts.

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `default_directives` is used, and if
/// that fails to parse only errors are shown. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init_tracing(default_directives: &str) {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(default_directives) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}
