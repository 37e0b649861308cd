use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

pub fn setup_console_log() {
    setup_logging(None::<&Path>);
}

/// Installs the global subscriber. When `log_dir` is given, a daily rolling
/// file is written next to the console output; keep the returned guard alive
/// until shutdown so buffered lines get flushed.
pub fn setup_logging(log_dir: Option<impl AsRef<Path>>) -> Option<WorkerGuard> {
    use std::io;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let console_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stdout)
        .boxed();
    let mut layers = vec![console_log];

    let guard = log_dir.map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, "linkvault.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
        guard
    });

    tracing_subscriber::registry()
        .with(layers)
        .with(EnvFilter::from_default_env())
        .init();

    guard
}
