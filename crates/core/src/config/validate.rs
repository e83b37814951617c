use super::{types::Config, ConfigError};
use crate::dispatcher::MAX_RETRY_DELAY_SECS;
use crate::mixer::MAX_GAIN;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Poll interval, batch cap and scan limit are at least 1
/// - Retry delays do not exceed MAX_RETRY_DELAY_SECS
/// - Mix gains lie within [0, MAX_GAIN]
/// - A default ambient track is configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.pipeline.max_jobs_per_run == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.max_jobs_per_run must be at least 1".to_string(),
        ));
    }

    if config.pipeline.scan_limit < 1 {
        return Err(ConfigError::ValidationError(
            "pipeline.scan_limit must be at least 1".to_string(),
        ));
    }

    if config.pipeline.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.poll_interval_ms must be at least 1".to_string(),
        ));
    }

    for (name, secs) in [
        (
            "pipeline.retry_base_delay_secs",
            config.pipeline.retry_base_delay_secs,
        ),
        (
            "pipeline.retry_max_delay_secs",
            config.pipeline.retry_max_delay_secs,
        ),
    ] {
        if secs > MAX_RETRY_DELAY_SECS {
            return Err(ConfigError::ValidationError(format!(
                "{} must be at most {} (30 days), got {}",
                name, MAX_RETRY_DELAY_SECS, secs
            )));
        }
    }

    for (name, gain) in [
        ("mix.narration_gain", config.mix.narration_gain),
        ("mix.ambient_gain", config.mix.ambient_gain),
    ] {
        if !(0.0..=MAX_GAIN).contains(&gain) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 0 and {}, got {}",
                name, MAX_GAIN, gain
            )));
        }
    }

    if config.mix.default_ambient_track.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "mix.default_ambient_track cannot be empty".to_string(),
        ));
    }

    Ok(())
}
