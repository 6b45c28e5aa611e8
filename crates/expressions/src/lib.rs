//! # Chronoscope Expressions
//!
//! Filter and derivation expressions used by the preprocessor.
//!
//! ## Architectural Principles
//!
//! - **Capability Trait:** The preprocessor only sees `ExpressionEvaluator`, so any
//!   engine that can turn expression text into steps of a polars `LazyFrame` plan
//!   can be plugged in.
//! - **Check Before Reading:** Compiled steps are run once against an empty frame
//!   of the source schema (`check_plan`), so syntax, unknown-column and type
//!   errors surface before the first row is read.
//!
//! ## Public API
//!
//! - `ExpressionEvaluator` / `CompiledExpression` / `CompiledFilter`: the contract.
//! - `SqlEvaluator`: polars SQL (`SQLContext` for filters, `sql_expr` for derivations).
//! - `ExpressionError`: invalid, unknown-column and evaluation failures.

pub mod error;
pub mod sql;
pub mod traits;

pub use error::ExpressionError;
pub use sql::SqlEvaluator;
pub use traits::{check_plan, CompiledExpression, CompiledFilter, ExpressionEvaluator};
