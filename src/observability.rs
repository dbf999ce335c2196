//! Logging setup and structured metric hooks for the hash-bucket stage.
//!
//! Library code only talks to the `log` facade. Binaries and test harnesses
//! that want output call [`init_logging`] once at their boundary.

use std::fs::OpenOptions;
use std::sync::Once;

use crate::config::LoggingConfig;
use crate::error::BucketError;

/// Logs a structured key-value metric line at debug level.
///
/// # Example
/// ```
/// use delta_bucket::log_metric;
/// let buckets = 4;
/// log_metric!("event"="partition_table", "num_buckets"=&buckets);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::__log::debug!("BUCKET_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs a process-wide `env_logger` configured from `config`.
///
/// Only the first call has any effect. Opening the log file is the one step
/// that can fail, and that failure is returned to the caller.
pub fn init_logging(config: &LoggingConfig) -> Result<(), BucketError> {
    let target = match &config.log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };
    let level = config.level_filter()?;

    INIT_LOGGER.call_once(move || {
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
