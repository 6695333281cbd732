//! This module provides observability and diagnostics for the patch codec.
//!
//! The codec is deterministic but opaque: a wrong seed or an off-by-one in the
//! container tail produces garbage pixels, not an error message. The
//! `log_metric!` macro makes each stage boundary visible as a structured
//! key/value line on the `log` facade, and `init_logging` wires that facade to
//! `env_logger`.
//!
//! `log_metric!` is compiled out of release builds via `#[cfg(debug_assertions)]`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::PatchError;

/// Logs a structured key-value metric line at debug level, only in debug builds.
///
/// # Example
/// ```
/// use texpatch::log_metric;
/// let rows = 4;
/// log_metric!("event" = "pack", "container_rows" = rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("TEXPATCH_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend once per process.
///
/// Lines are formatted as `[LEVEL] message`. When `log_file` is given, output
/// is appended to that file instead of stderr. Later calls are no-ops.
///
/// # Errors
/// Returns `PatchError::Io` if the log file cannot be opened.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), PatchError> {
    let target = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
