use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the JSON log subscriber on stderr.
///
/// `RUST_LOG` is honored; on top of it dashsync crates log at info level, or
/// only errors when `quiet` is set. Stdout stays reserved for command output.
pub fn init_logging(quiet: bool) {
    let directive = if quiet { "dashsync=error" } else { "dashsync=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("static log directive is valid")),
        )
        .init();
}
