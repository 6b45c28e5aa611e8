use crate::enums::DataType;
use crate::error::CoreError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell.
///
/// A column's values are expected to match its declared `DataType`, but a
/// source may deliver a chunk of a typed column as text when its cells fail
/// to parse. Consumers decide how to treat such mixed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type this value would have as a column of its own.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Float),
            Value::Bool(_) => Some(DataType::Boolean),
            Value::Text(_) => Some(DataType::Text),
            Value::Date(_) => Some(DataType::Date),
            Value::DateTime(_) => Some(DataType::DateTime),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Dates are widened to midnight.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            Value::DateTime(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
        }
    }
}

/// A named, typed schema entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered mapping of column name to data type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Builds a schema, rejecting duplicate column names.
    pub fn new(fields: Vec<Field>) -> Result<Self, CoreError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(CoreError::DuplicateColumn(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, DataType)>,
    ) -> Result<Self, CoreError> {
        Self::new(pairs.into_iter().map(|(n, t)| Field::new(n, t)).collect())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<DataType> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.data_type)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Replaces the type of an existing column in place, or appends a new one.
    pub fn with_column(&self, name: &str, data_type: DataType) -> Schema {
        let mut fields = self.fields.clone();
        match fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.data_type = data_type,
            None => fields.push(Field::new(name, data_type)),
        }
        Schema { fields }
    }

    /// Drops every column named in `names`; unknown names are ignored.
    pub fn without(&self, names: &[String]) -> Schema {
        Schema {
            fields: self
                .fields
                .iter()
                .filter(|f| !names.contains(&f.name))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field.name, field.data_type)?;
        }
        Ok(())
    }
}

/// A finalised metric value: a number, or a timestamp for temporal min/max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Timestamp(NaiveDateTime),
}

impl MetricValue {
    /// Numeric view used by outlier detection; timestamps become seconds
    /// since the Unix epoch.
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Number(v) => *v,
            MetricValue::Timestamp(ts) => {
                let utc = ts.and_utc();
                utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1e9
            }
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{v}"),
            MetricValue::Timestamp(ts) => write!(f, "{ts}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_column_replaces_in_place_and_appends_at_end() {
        let schema = Schema::from_pairs([("a", DataType::Integer), ("b", DataType::Text)])
            .unwrap()
            .with_column("a", DataType::Float)
            .with_column("c", DataType::Boolean);
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(schema.get("a"), Some(DataType::Float));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Schema::from_pairs([("a", DataType::Integer), ("a", DataType::Text)]).unwrap_err();
        assert_eq!(err, CoreError::DuplicateColumn("a".into()));
    }

    #[test]
    fn timestamps_convert_to_epoch_seconds() {
        let ts = chrono::NaiveDate::from_ymd_opt(1970, 1, 2)
            .unwrap()
            .and_hms_milli_opt(0, 0, 1, 500)
            .unwrap();
        assert_eq!(MetricValue::Timestamp(ts).as_f64(), 86_401.5);
    }
}
