use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upstream API keys are non-empty
/// - Pipeline budgets and ratios are sane
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.tmdb.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tmdb.api_key cannot be empty".to_string(),
        ));
    }

    if config.youtube.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "youtube.api_key cannot be empty".to_string(),
        ));
    }

    let pipeline = &config.pipeline;
    if pipeline.default_pages == 0 || pipeline.default_pages > pipeline.max_pages {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.default_pages must be in 1..={}",
            pipeline.max_pages
        )));
    }

    if pipeline.fetch_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.fetch_concurrency cannot be 0".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&pipeline.movie_share) {
        return Err(ConfigError::ValidationError(
            "pipeline.movie_share must be between 0.0 and 1.0".to_string(),
        ));
    }

    if pipeline.interleave_run == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.interleave_run cannot be 0".to_string(),
        ));
    }

    for (name, mood) in &config.moods {
        if mood.genres.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "moods.{name}.genres cannot be empty"
            )));
        }
        if mood.keywords.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "moods.{name}.keywords cannot be empty"
            )));
        }
    }

    Ok(())
}
