use crate::error::ExpressionError;
use core_types::frame::schema_of;
use core_types::Schema;
use polars::prelude::{Expr, LazyFrame};
use std::fmt;

/// A column derivation compiled once and applied to every chunk.
pub trait CompiledExpression: fmt::Debug + Send + Sync {
    /// The expression text as written.
    fn source(&self) -> &str;

    /// The polars expression computing the column.
    fn expr(&self) -> Expr;
}

/// A row filter, which engines may also let drop columns.
pub trait CompiledFilter: fmt::Debug + Send + Sync {
    fn source(&self) -> &str;

    /// Adds the filter to a lazy plan.
    fn apply(&self, frame: LazyFrame) -> Result<LazyFrame, ExpressionError>;
}

/// The capability the preprocessor needs from an expression engine.
///
/// Compilation happens once per run. The preprocessor then checks the
/// compiled steps with `check_plan` against an empty frame of the source
/// schema, so syntax, unknown-column and type errors surface before any row
/// is read.
pub trait ExpressionEvaluator {
    fn compile_filter(&self, expression: &str) -> Result<Box<dyn CompiledFilter>, ExpressionError>;

    fn compile_derivation(
        &self,
        expression: &str,
    ) -> Result<Box<dyn CompiledExpression>, ExpressionError>;
}

/// Runs `frame` and returns the schema it produces, blaming `expression`
/// for any failure.
///
/// `frame` is executed, so it must be built on an empty input.
pub fn check_plan(expression: &str, frame: &LazyFrame) -> Result<Schema, ExpressionError> {
    let output = frame
        .clone()
        .collect()
        .map_err(|e| ExpressionError::planning(expression, e))?;
    schema_of(&output.schema()).map_err(|e| ExpressionError::Invalid {
        expression: expression.to_string(),
        message: e.to_string(),
    })
}
