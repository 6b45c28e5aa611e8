use core_types::TimeInterval;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved name looked up when no `date_column` is configured.
pub const DEFAULT_DATE_COLUMN: &str = "date_column";

/// Reserved name looked up when no `target_column` is configured.
pub const DEFAULT_TARGET_COLUMN: &str = "target_column";

/// Rows per chunk in streaming mode when `chunk_size` is omitted.
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// The root configuration structure for one evaluation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvaluationConfig {
    /// Where the data comes from.
    pub source: SourceConfig,
    /// Row (and optionally column) selection applied before anything else.
    #[serde(default)]
    pub filter: Option<String>,
    /// Derived or replaced columns, applied strictly in the listed order.
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    /// Column to bucket by; falls back to `date_column`.
    #[serde(default)]
    pub date_column: Option<String>,
    /// Bucket width, e.g. "1d", "6h", "1mo".
    #[serde(default)]
    pub time_interval: TimeInterval,
    /// Column whose bucketed mean is reported as the target average;
    /// falls back to `target_column`.
    #[serde(default)]
    pub target_column: Option<String>,
    /// Columns left out of the statistics. Still visible to expressions.
    #[serde(default)]
    pub columns_to_exclude: Vec<String>,
    #[serde(default)]
    pub outliers: OutlierSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub bucket_policy: BucketPolicy,
}

/// Describes the dataset to open.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceConfig {
    /// File path or URI. Values starting with `$` name an environment variable.
    #[serde(default, alias = "file_path", alias = "path_or_uri")]
    pub path: Option<String>,
    /// Explicit format; otherwise derived from the path extension.
    #[serde(default, alias = "file_format")]
    pub format: Option<String>,
    /// Forces the type of selected columns instead of inferring it.
    #[serde(default)]
    pub schema_overrides: Vec<SchemaOverride>,
    /// Credentials for cloud storage. Values starting with `$` name an
    /// environment variable.
    #[serde(default)]
    pub storage_options: BTreeMap<String, String>,
    /// Query text for database sources.
    #[serde(default)]
    pub query: Option<String>,
    /// Connection URI for database sources.
    #[serde(default)]
    pub uri: Option<String>,
}

/// A single forced column type, e.g. `{ column = "day", type = "Date" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchemaOverride {
    pub column: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// One derived column: `name` is created, or replaced if it already exists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transformation {
    pub name: String,
    pub expression: String,
}

/// The outlier rule applied to every series in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutlierCriterion {
    #[default]
    #[serde(rename = "IQR", alias = "iqr")]
    #[cfg_attr(feature = "clap", value(name = "iqr"))]
    Iqr,
    #[serde(rename = "Z-score", alias = "z-score", alias = "zscore", alias = "z_score")]
    #[cfg_attr(feature = "clap", value(name = "z-score"))]
    ZScore,
}

/// Parameters for outlier detection.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OutlierSettings {
    #[serde(default)]
    pub criterion: OutlierCriterion,
    /// Multiplier `m` in `[Q1 - m*IQR, Q3 + m*IQR]`.
    #[serde(default = "default_multiplier_iqr")]
    pub multiplier_iqr: f64,
    /// A point is an outlier when `|x - mean| / std` exceeds this.
    #[serde(default = "default_threshold_z_score")]
    pub threshold_z_score: f64,
}

fn default_multiplier_iqr() -> f64 {
    1.5
}

fn default_threshold_z_score() -> f64 {
    3.0
}

impl Default for OutlierSettings {
    fn default() -> Self {
        Self {
            criterion: OutlierCriterion::default(),
            multiplier_iqr: default_multiplier_iqr(),
            threshold_z_score: default_threshold_z_score(),
        }
    }
}

/// How the source is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// The source is materialized as a single table.
    #[default]
    Auto,
    /// The source is read and folded in chunks of `chunk_size` rows.
    Streaming,
}

/// Exactness of `unique_count` for text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistinctCount {
    /// Every distinct value is retained per bucket.
    Exact,
    /// HyperLogLog estimate with bounded memory; disables `mode_frequency`.
    Approximate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub mode: EngineMode,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub distinct_count: Option<DistinctCount>,
}

impl EngineSettings {
    /// Rows per chunk, or `None` to materialize the whole source.
    pub fn effective_chunk_size(&self) -> Option<usize> {
        match self.mode {
            EngineMode::Auto => None,
            EngineMode::Streaming => Some(self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)),
        }
    }

    /// Exact in `auto` mode and approximate in `streaming` mode unless set.
    pub fn effective_distinct_count(&self) -> DistinctCount {
        self.distinct_count.unwrap_or(match self.mode {
            EngineMode::Auto => DistinctCount::Exact,
            EngineMode::Streaming => DistinctCount::Approximate,
        })
    }
}

/// Whether intervals without rows inside the observed range become buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketPolicy {
    /// Only intervals containing at least one row.
    #[default]
    Sparse,
    /// Every interval between the first and last observed bucket.
    Continuous,
}

impl EvaluationConfig {
    /// A configuration with every optional setting at its default.
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            filter: None,
            transformations: Vec::new(),
            date_column: None,
            time_interval: TimeInterval::default(),
            target_column: None,
            columns_to_exclude: Vec::new(),
            outliers: OutlierSettings::default(),
            engine: EngineSettings::default(),
            bucket_policy: BucketPolicy::default(),
        }
    }

    /// The configured date column or the reserved default name.
    pub fn date_column_name(&self) -> &str {
        self.date_column.as_deref().unwrap_or(DEFAULT_DATE_COLUMN)
    }

    /// The configured target column or the reserved default name.
    pub fn target_column_name(&self) -> &str {
        self.target_column.as_deref().unwrap_or(DEFAULT_TARGET_COLUMN)
    }
}
