use crate::error::ExpressionError;
use crate::traits::{CompiledExpression, CompiledFilter, ExpressionEvaluator};
use polars::prelude::{Expr, LazyFrame};
use polars::sql::{sql_expr, SQLContext};

/// Name under which a chunk is visible to filter queries.
pub const FRAME_TABLE: &str = "self";

/// Expressions in polars' SQL dialect.
///
/// A filter is either a full query over the `self` table
/// (`SELECT a, b FROM self WHERE x > 1`) or a bare predicate, which is run
/// as `SELECT * FROM self WHERE <predicate>`. Derivations are single SQL
/// expressions such as `amount * 2` or `CASE WHEN ... END`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlEvaluator;

impl SqlEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator for SqlEvaluator {
    fn compile_filter(&self, expression: &str) -> Result<Box<dyn CompiledFilter>, ExpressionError> {
        let query = if is_query(expression) {
            expression.trim().to_string()
        } else {
            format!("SELECT * FROM {FRAME_TABLE} WHERE {expression}")
        };
        Ok(Box::new(SqlFilter {
            source: expression.to_string(),
            query,
        }))
    }

    fn compile_derivation(
        &self,
        expression: &str,
    ) -> Result<Box<dyn CompiledExpression>, ExpressionError> {
        let expr = sql_expr(expression).map_err(|e| ExpressionError::planning(expression, e))?;
        Ok(Box::new(SqlExpression {
            source: expression.to_string(),
            expr,
        }))
    }
}

fn is_query(expression: &str) -> bool {
    expression
        .split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("select") || word.eq_ignore_ascii_case("with"))
}

#[derive(Debug, Clone)]
struct SqlFilter {
    source: String,
    query: String,
}

impl SqlFilter {
    fn context(frame: LazyFrame) -> SQLContext {
        let mut context = SQLContext::new();
        context.register(FRAME_TABLE, frame);
        context
    }
}

impl CompiledFilter for SqlFilter {
    fn source(&self) -> &str {
        &self.source
    }

    fn apply(&self, frame: LazyFrame) -> Result<LazyFrame, ExpressionError> {
        Self::context(frame)
            .execute(&self.query)
            .map_err(|e| ExpressionError::planning(&self.source, e))
    }
}

#[derive(Debug, Clone)]
struct SqlExpression {
    source: String,
    expr: Expr,
}

impl CompiledExpression for SqlExpression {
    fn source(&self) -> &str {
        &self.source
    }

    fn expr(&self) -> Expr {
        self.expr.clone()
    }
}
