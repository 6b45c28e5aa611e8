use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Rejected while planning: bad syntax, unsupported SQL or mismatched types.
    #[error("Invalid expression `{expression}`: {message}")]
    Invalid { expression: String, message: String },

    #[error("Unknown column `{column}` referenced in `{expression}`")]
    UnknownColumn { column: String, expression: String },

    #[error("Failed to evaluate `{expression}`: {message}")]
    Evaluation { expression: String, message: String },
}

impl ExpressionError {
    /// True when the expression is well formed but names a column the
    /// schema does not have.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, ExpressionError::UnknownColumn { .. })
    }

    /// Classifies a polars error raised while planning `expression`.
    pub fn planning(expression: &str, err: PolarsError) -> Self {
        match missing_column(&err) {
            Some(column) => ExpressionError::UnknownColumn {
                column,
                expression: expression.to_string(),
            },
            None => ExpressionError::Invalid {
                expression: expression.to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Wraps a polars error raised while running `expression` on data.
    pub fn evaluation(expression: &str, err: PolarsError) -> Self {
        ExpressionError::Evaluation {
            expression: expression.to_string(),
            message: err.to_string(),
        }
    }
}

/// The column a "not found" error names. Lazy plans may wrap the error in
/// context, so the rendered message is searched as well.
fn missing_column(err: &PolarsError) -> Option<String> {
    let message = match err {
        PolarsError::ColumnNotFound(name) | PolarsError::SchemaFieldNotFound(name) => {
            name.to_string()
        }
        other => other
            .to_string()
            .lines()
            .find_map(|line| line.trim().strip_prefix("not found: "))
            .map(str::to_string)?,
    };
    let column = message.lines().next().unwrap_or_default().trim().trim_matches('"');
    Some(column.to_string())
}
