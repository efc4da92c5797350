use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;
use crate::error::ServerError;

/// Environment variable that overrides `--log-level` with a full filter.
pub const LOG_FILTER_ENV: &str = "TICKERPULSE_LOG";

pub fn init_tracing(log_level: &str, log_format: LogFormat) -> Result<(), ServerError> {
    let filter = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|err| ServerError::Logging(format!("invalid log filter: {err}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let installed = match log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|err| ServerError::Logging(err.to_string()))
}
