use playground_infrastructure::PlaygroundPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Sends tracing output to `~/.config/playground/logs/playground.log.YYYY-MM-DD`
/// so it never interleaves with the REPL on stdout.
///
/// Returns the writer guard; logs are flushed when it is dropped. `None`
/// means no log directory could be determined and logging stays off.
pub fn init() -> Option<WorkerGuard> {
    let logs_dir = PlaygroundPaths::logs_dir().ok()?;
    let file_appender = tracing_appender::rolling::daily(logs_dir, "playground.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
