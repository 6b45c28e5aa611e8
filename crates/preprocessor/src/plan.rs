use crate::error::PreprocessError;
use configuration::{EvaluationConfig, Transformation, DEFAULT_DATE_COLUMN};
use core_types::frame::{empty_frame, series_values};
use core_types::temporal::parse_timestamp;
use core_types::{Bucket, DataType, Schema, TimeInterval, Value};
use expressions::{check_plan, CompiledExpression, CompiledFilter, ExpressionError, ExpressionEvaluator};
use polars::prelude::{DataFrame, IdxCa, IdxSize, IntoLazy, LazyFrame, NewChunkedArray};
use std::collections::BTreeMap;

/// The preprocessing settings, independent of where they were loaded from.
#[derive(Debug, Clone, Default)]
pub struct PreprocessOptions {
    pub filter: Option<String>,
    pub transformations: Vec<Transformation>,
    pub date_column: Option<String>,
    pub time_interval: TimeInterval,
    pub columns_to_exclude: Vec<String>,
}

impl PreprocessOptions {
    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            transformations: config.transformations.clone(),
            date_column: config.date_column.clone(),
            time_interval: config.time_interval,
            columns_to_exclude: config.columns_to_exclude.clone(),
        }
    }
}

/// The rows of one chunk, grouped by bucket.
#[derive(Debug, Clone, Default)]
pub struct BucketedChunk {
    /// Ascending, unique buckets and their rows (post-transformation columns).
    pub groups: Vec<(Bucket, DataFrame)>,
    /// Rows that survived the filter but had no date.
    pub dropped_null_dates: usize,
}

impl BucketedChunk {
    pub fn num_rows(&self) -> usize {
        self.groups.iter().map(|(_, frame)| frame.height()).sum()
    }
}

/// Filter, transformations and date handling, checked against one input
/// schema.
///
/// `compile` runs every step on an empty frame of that schema, so applying
/// the plan to chunks cannot hit configuration, schema or expression errors
/// anymore, except for unparseable date text.
#[derive(Debug)]
pub struct PreprocessPlan {
    filter: Option<Box<dyn CompiledFilter>>,
    transformations: Vec<(String, Box<dyn CompiledExpression>)>,
    schema: Schema,
    date_column: String,
    interval: TimeInterval,
    statistics_schema: Schema,
}

impl PreprocessPlan {
    pub fn compile(
        options: &PreprocessOptions,
        input_schema: &Schema,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Self, PreprocessError> {
        let mut template = empty_frame(input_schema)?.lazy();
        let mut schema = input_schema.clone();

        let filter = match options.filter.as_deref() {
            Some(expression) => {
                let compiled = evaluator.compile_filter(expression)?;
                template = compiled.apply(template)?;
                schema = check_plan(expression, &template)?;
                tracing::info!(filter = expression, "Filter applied");
                Some(compiled)
            }
            None => None,
        };

        let mut transformations = Vec::with_capacity(options.transformations.len());
        for t in &options.transformations {
            let compiled = evaluator.compile_derivation(&t.expression)?;
            template = template.with_column(compiled.expr().alias(&t.name));
            schema = check_plan(&t.expression, &template)?;
            tracing::info!(
                column = %t.name,
                expression = %t.expression,
                data_type = ?schema.get(&t.name),
                "Transformation applied"
            );
            transformations.push((t.name.clone(), compiled));
        }

        let date_column = resolve_date_column(options.date_column.as_deref(), &schema)?;
        tracing::info!(column = %date_column, interval = %options.time_interval, "Date column");

        for name in &options.columns_to_exclude {
            if !schema.contains(name) {
                tracing::warn!(column = %name, "Excluded column is not in the data");
            }
        }
        let mut hidden = options.columns_to_exclude.clone();
        hidden.push(date_column.clone());
        let statistics_schema = schema.without(&hidden);

        Ok(Self {
            filter,
            transformations,
            schema,
            date_column,
            interval: options.time_interval,
            statistics_schema,
        })
    }

    /// The schema of the row groups: input schema after filter and
    /// transformations.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The columns statistics are computed for, in schema order.
    pub fn statistics_schema(&self) -> &Schema {
        &self.statistics_schema
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    /// Adds the filter and the transformations to a lazy plan over one chunk.
    fn plan(&self, frame: LazyFrame) -> Result<LazyFrame, ExpressionError> {
        let mut frame = match &self.filter {
            Some(filter) => filter.apply(frame)?,
            None => frame,
        };
        for (name, expression) in &self.transformations {
            frame = frame.with_column(expression.expr().alias(name));
        }
        Ok(frame)
    }

    fn steps(&self) -> String {
        self.filter
            .iter()
            .map(|f| f.source())
            .chain(self.transformations.iter().map(|(_, e)| e.source()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Runs the plan over one chunk of the input.
    pub fn apply(&self, chunk: DataFrame) -> Result<BucketedChunk, PreprocessError> {
        let frame = self
            .plan(chunk.lazy())?
            .collect()
            .map_err(|e| ExpressionError::evaluation(&self.steps(), e))?;

        let dates = frame
            .column(&self.date_column)
            .map_err(|_| PreprocessError::MissingDateColumn {
                requested: self.date_column.clone(),
                schema: self.schema.clone(),
            })?;

        let mut rows_by_bucket: BTreeMap<Bucket, Vec<IdxSize>> = BTreeMap::new();
        let mut dropped_null_dates = 0usize;
        for (row, value) in series_values(dates)?.into_iter().enumerate() {
            let timestamp = match value {
                Value::Null => {
                    dropped_null_dates += 1;
                    continue;
                }
                Value::Text(text) => parse_timestamp(&text).ok_or_else(|| {
                    PreprocessError::UnparseableDate {
                        column: self.date_column.clone(),
                        value: text.clone(),
                    }
                })?,
                other => other
                    .as_timestamp()
                    .ok_or_else(|| PreprocessError::UnparseableDate {
                        column: self.date_column.clone(),
                        value: other.to_string(),
                    })?,
            };
            let bucket = self.interval.truncate(timestamp)?;
            let row = IdxSize::try_from(row).map_err(|_| {
                PreprocessError::Core(core_types::CoreError::OutOfRange(format!("row {row}")))
            })?;
            rows_by_bucket.entry(bucket).or_default().push(row);
        }

        let groups = rows_by_bucket
            .into_iter()
            .map(|(bucket, rows)| Ok((bucket, frame.take(&IdxCa::from_vec("", rows))?)))
            .collect::<Result<Vec<_>, PreprocessError>>()?;

        Ok(BucketedChunk {
            groups,
            dropped_null_dates,
        })
    }
}

/// The configured column if the schema has it, otherwise the reserved default.
fn resolve_date_column(requested: Option<&str>, schema: &Schema) -> Result<String, PreprocessError> {
    let candidates = requested.into_iter().chain(std::iter::once(DEFAULT_DATE_COLUMN));
    let mut found = None;
    for name in candidates {
        if let Some(data_type) = schema.get(name) {
            found = Some((name, data_type));
            break;
        }
    }
    let Some((name, data_type)) = found else {
        return Err(PreprocessError::MissingDateColumn {
            requested: requested.unwrap_or(DEFAULT_DATE_COLUMN).to_string(),
            schema: schema.clone(),
        });
    };
    if requested.is_some_and(|r| r != name) {
        tracing::warn!(
            requested = requested.unwrap_or_default(),
            fallback = name,
            "Configured date column not found, using the default name"
        );
    }
    match data_type {
        DataType::Date | DataType::DateTime | DataType::Text => Ok(name.to_string()),
        other => Err(PreprocessError::InvalidDateType {
            column: name.to_string(),
            data_type: other,
        }),
    }
}
