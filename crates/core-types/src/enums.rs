use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The physical type a connector declares for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Text,
    Date,
    DateTime,
}

impl DataType {
    /// Returns the semantic category that decides which metrics apply.
    pub fn category(&self) -> ColumnCategory {
        match self {
            DataType::Integer | DataType::Float => ColumnCategory::Numeric,
            DataType::Boolean => ColumnCategory::Boolean,
            DataType::Text => ColumnCategory::Text,
            DataType::Date | DataType::DateTime => ColumnCategory::Temporal,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::DateTime)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
            DataType::Text => "Text",
            DataType::Date => "Date",
            DataType::DateTime => "DateTime",
        };
        f.write_str(name)
    }
}

impl FromStr for DataType {
    type Err = CoreError;

    /// Accepts the type names users write in `schema_overrides`, including the
    /// dataframe-style aliases (`String`, `Int64`, `Float64`, `Datetime`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "int64" | "int32" | "bigint" => Ok(DataType::Integer),
            "float" | "float64" | "float32" | "double" | "real" => Ok(DataType::Float),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "text" | "string" | "str" | "utf8" | "varchar" | "categorical" => Ok(DataType::Text),
            "date" => Ok(DataType::Date),
            "datetime" | "timestamp" => Ok(DataType::DateTime),
            _ => Err(CoreError::UnknownDataType(s.to_string())),
        }
    }
}

/// Semantic grouping of data types used to pick a column's metric set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCategory {
    Numeric,
    Text,
    Boolean,
    Temporal,
}

impl ColumnCategory {
    /// The metric set for this category, in canonical order.
    pub fn metrics(&self) -> &'static [Metric] {
        match self {
            ColumnCategory::Numeric => &[
                Metric::Count,
                Metric::NullCount,
                Metric::NullRatio,
                Metric::UniqueCount,
                Metric::Mean,
                Metric::Std,
                Metric::Min,
                Metric::Max,
                Metric::P25,
                Metric::Median,
                Metric::P75,
            ],
            ColumnCategory::Text => &[
                Metric::Count,
                Metric::NullCount,
                Metric::NullRatio,
                Metric::UniqueCount,
                Metric::ModeFrequency,
            ],
            ColumnCategory::Boolean => &[
                Metric::Count,
                Metric::NullCount,
                Metric::NullRatio,
                Metric::Mean,
            ],
            ColumnCategory::Temporal => &[
                Metric::Count,
                Metric::NullCount,
                Metric::NullRatio,
                Metric::Min,
                Metric::Max,
            ],
        }
    }
}

/// A per-bucket statistic. Declaration order is the canonical report order,
/// so `Ord` and `BTreeMap<Metric, _>` iterate canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Count,
    NullCount,
    NullRatio,
    UniqueCount,
    ModeFrequency,
    Mean,
    Std,
    Min,
    Max,
    P25,
    Median,
    P75,
}

impl Metric {
    /// Machine-readable name, stable across releases.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Count => "count",
            Metric::NullCount => "null_count",
            Metric::NullRatio => "null_ratio",
            Metric::UniqueCount => "unique_count",
            Metric::ModeFrequency => "mode_frequency",
            Metric::Mean => "mean",
            Metric::Std => "std",
            Metric::Min => "min",
            Metric::Max => "max",
            Metric::P25 => "p25",
            Metric::Median => "median",
            Metric::P75 => "p75",
        }
    }

    /// Human-readable title for report and chart captions.
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Count => "Number of values",
            Metric::NullCount => "Number of missing values",
            Metric::NullRatio => "Proportion of missing values",
            Metric::UniqueCount => "Number of unique values",
            Metric::ModeFrequency => "Frequency of the most common value",
            Metric::Mean => "Mean",
            Metric::Std => "Standard deviation",
            Metric::Min => "Min",
            Metric::Max => "Max",
            Metric::P25 => "25th percentile",
            Metric::Median => "Median",
            Metric::P75 => "75th percentile",
        }
    }

    /// The quantile level for percentile metrics.
    pub fn quantile(&self) -> Option<f64> {
        match self {
            Metric::P25 => Some(0.25),
            Metric::Median => Some(0.5),
            Metric::P75 => Some(0.75),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
