use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use super::config::{Config, LOG_FILE_NAME};

const DEFAULT_FILTER: &str = "streamlite_server=info,streamlite_core=info,tower_http=info";

/// Installs the global subscriber: stdout always, plus `CONFIG_DIR/streamlite.log`
/// when file logging is on. Keep the returned guard alive for the life of the
/// process or buffered file output is lost.
pub fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let (file_layer, guard) = if config.log_to_file {
        let appender = tracing_appender::rolling::never(&config.config_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}
