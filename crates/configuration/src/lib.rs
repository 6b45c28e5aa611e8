use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    BucketPolicy, DistinctCount, EngineMode, EngineSettings, EvaluationConfig, OutlierCriterion,
    OutlierSettings, SchemaOverride, SourceConfig, Transformation, DEFAULT_CHUNK_SIZE,
    DEFAULT_DATE_COLUMN, DEFAULT_TARGET_COLUMN,
};

/// Prefix for environment variables that override file settings,
/// e.g. `CHRONOSCOPE_TIME_INTERVAL=6h` or `CHRONOSCOPE_OUTLIERS__CRITERION=Z-score`.
pub const ENV_PREFIX: &str = "CHRONOSCOPE";

/// Loads and validates an evaluation configuration.
///
/// The format (TOML, JSON or YAML) is picked from the file extension.
/// Environment variables prefixed with `CHRONOSCOPE_` override file values.
pub fn load_config(path: &Path) -> Result<EvaluationConfig, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `EvaluationConfig` struct
    let config = builder.try_deserialize::<EvaluationConfig>()?;
    validate(&config)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Checks the settings that serde alone cannot enforce.
pub fn validate(config: &EvaluationConfig) -> Result<(), ConfigError> {
    let source = &config.source;
    let has_path = source.path.as_deref().is_some_and(|p| !p.trim().is_empty());
    let has_query = source.query.is_some() && source.uri.is_some();
    if !has_path && !has_query {
        return Err(ConfigError::ValidationError(
            "`source` needs either `path` or both `query` and `uri`".to_string(),
        ));
    }

    if let Some(filter) = &config.filter {
        if filter.trim().is_empty() {
            return Err(ConfigError::ValidationError("`filter` is empty".to_string()));
        }
    }

    for (i, t) in config.transformations.iter().enumerate() {
        if t.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "transformation #{} has an empty `name`",
                i + 1
            )));
        }
        if t.expression.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "transformation `{}` has an empty `expression`",
                t.name
            )));
        }
    }

    let outliers = &config.outliers;
    if !outliers.multiplier_iqr.is_finite() || outliers.multiplier_iqr < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "`outliers.multiplier_iqr` must be a non-negative number, got {}",
            outliers.multiplier_iqr
        )));
    }
    if !outliers.threshold_z_score.is_finite() || outliers.threshold_z_score <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "`outliers.threshold_z_score` must be a positive number, got {}",
            outliers.threshold_z_score
        )));
    }

    if config.engine.chunk_size == Some(0) {
        return Err(ConfigError::ValidationError(
            "`engine.chunk_size` must be greater than zero".to_string(),
        ));
    }
    if config.engine.mode == EngineMode::Auto && config.engine.chunk_size.is_some() {
        tracing::warn!("`engine.chunk_size` is ignored unless `engine.mode` is \"streaming\"");
    }

    Ok(())
}
