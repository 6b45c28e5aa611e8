//! Running mean of the target column.

use crate::descriptive::sort_values;
use core_types::Value;

/// Integer and boolean targets are summed exactly, so their state does not
/// grow with the number of rows. Float targets are retained and summed in
/// ascending order when the mean is taken, which keeps the result independent
/// of how the rows were chunked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetAccumulator {
    exact_count: u64,
    exact_sum: i128,
    floats: Vec<f64>,
}

impl TargetAccumulator {
    /// Nulls, NaN and non-numeric values are skipped.
    pub fn push(&mut self, value: &Value) {
        match value {
            Value::Int(v) => {
                self.exact_count += 1;
                self.exact_sum += i128::from(*v);
            }
            Value::Bool(v) => {
                self.exact_count += 1;
                self.exact_sum += i128::from(*v);
            }
            Value::Float(v) if !v.is_nan() => self.floats.push(*v),
            _ => {}
        }
    }

    pub fn update(&mut self, values: &[Value]) {
        for value in values {
            self.push(value);
        }
    }

    pub fn merge(&mut self, other: TargetAccumulator) {
        self.exact_count += other.exact_count;
        self.exact_sum += other.exact_sum;
        self.floats.extend(other.floats);
    }

    /// Values averaged so far.
    pub fn count(&self) -> u64 {
        self.exact_count + self.floats.len() as u64
    }

    pub fn mean(&mut self) -> Option<f64> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        sort_values(&mut self.floats);
        let sum = self.exact_sum as f64 + self.floats.iter().sum::<f64>();
        Some(sum / count as f64)
    }
}
