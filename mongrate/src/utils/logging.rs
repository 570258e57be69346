use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber from `RUST_LOG`.
///
/// Engine progress is logged at info level but stays hidden by default; the
/// CLI reports outcomes on stdout itself. Set `RUST_LOG=mongrate=debug` to
/// watch the engine work. Also installs color_eyre panic reports.
pub fn init_logging() {
    color_eyre::install().expect("Unable to install color_eyre");

    // Read from `RUST_LOG` environment variable, with fallback to default
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(Level::WARN.into())
            .parse("mongrate=warn")
            .expect("Invalid filter directive")
    });

    fmt().with_env_filter(env_filter).with_target(false).init();
}
