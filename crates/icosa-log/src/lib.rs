//! Structured logging for the planet renderer.
//!
//! Console output with uptime timestamps and thread names (the LOD worker
//! runs on its own named thread), plus a JSON file in debug builds for
//! post-mortem analysis. The level comes from `RUST_LOG`, falling back to
//! the config file.

use std::fs::File;
use std::path::Path;

use icosa_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "icosa.log";

/// Always appended to the configured level; the GPU stack is very chatty.
const QUIET_DEPENDENCIES: &str = "wgpu=warn,naga=warn";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables the file layer
/// * `config` - supplies `debug.log_level` when `RUST_LOG` is unset
///
/// Calling this more than once leaves the first subscriber in place.
///
/// ```no_run
/// use icosa_config::Config;
/// use icosa_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && let Some(log_file) = open_log_file(log_dir)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        let _ = subscriber.with(file_layer).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

/// Filter directives used when `RUST_LOG` is not set.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|config| config.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or("info");
    format!("{level},{QUIET_DEPENDENCIES}")
}

/// Create `log_dir` if needed and truncate the log file inside it.
fn open_log_file(log_dir: &Path) -> Option<File> {
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}
