use crate::assembler::{assemble, RunContext};
use crate::error::EvaluationError;
use crate::result::EvaluationResult;
use configuration::EvaluationConfig;
use expressions::{ExpressionEvaluator, SqlEvaluator};
use preprocessor::{PreprocessOptions, PreprocessPlan};
use source::SourceHandle;
use statistics::{resolve_target, StatisticsEngine};

/// Opens the configured source and evaluates it with the built-in SQL
/// expression evaluator.
pub fn run(config: &EvaluationConfig) -> Result<EvaluationResult, EvaluationError> {
    let source = source::open_source(&config.source)?;
    evaluate(source.as_ref(), config, &SqlEvaluator)
}

/// Evaluates one source end to end: preprocess, fold statistics chunk by
/// chunk, detect outliers, assemble.
///
/// Every configuration, schema and expression error is raised before the
/// first row is read.
pub fn evaluate(
    source: &dyn SourceHandle,
    config: &EvaluationConfig,
    evaluator: &dyn ExpressionEvaluator,
) -> Result<EvaluationResult, EvaluationError> {
    configuration::validate(config)?;

    let options = PreprocessOptions::from_config(config);
    let plan = PreprocessPlan::compile(&options, source.schema(), evaluator)?;
    let target = resolve_target(config.target_column.as_deref(), plan.schema());
    if let Some(column) = &target {
        tracing::info!(column = %column, "Target column");
    }

    let distinct = config.engine.effective_distinct_count();
    let chunk_size = config.engine.effective_chunk_size();
    let mut engine = StatisticsEngine::new(plan.statistics_schema(), target, distinct);
    tracing::info!(
        columns = plan.statistics_schema().len(),
        chunk_size = ?chunk_size,
        distinct_count = ?distinct,
        "Computing statistics"
    );

    let mut dropped_null_dates = 0u64;
    for (index, chunk) in source.scan(chunk_size)?.enumerate() {
        let chunk = chunk?;
        let rows = chunk.height();
        let bucketed = plan.apply(chunk)?;
        dropped_null_dates += bucketed.dropped_null_dates as u64;
        engine.fold(&bucketed.groups)?;
        tracing::debug!(
            chunk = index + 1,
            rows,
            buckets = bucketed.groups.len(),
            "Chunk folded"
        );
    }
    if dropped_null_dates > 0 {
        tracing::warn!(
            rows = dropped_null_dates,
            column = plan.date_column(),
            "Dropped rows without a date"
        );
    }

    let report = engine.finish(config.bucket_policy, plan.interval())?;
    let result = assemble(
        report,
        RunContext {
            date_column: plan.date_column().to_string(),
            interval: plan.interval(),
            outliers: config.outliers,
            dropped_null_dates,
        },
    )?;

    tracing::info!(
        buckets = result.buckets().len(),
        rows = result.total_rows(),
        criterion = ?result.criterion(),
        "Evaluation finished"
    );
    Ok(result)
}
