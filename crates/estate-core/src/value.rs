//! Driver-independent values, rows and write outcomes.
//!
//! Every driver adapter converts its native result shapes into these types,
//! so callers of the query executor see one contract regardless of which
//! database sits underneath.

use std::fmt;

use serde::{ser::SerializeMap, Serialize, Serializer};

/// A single SQL value, used both for statement parameters and result cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of the value. Reals are truncated, text is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null | Value::Blob(_) => None,
        }
    }

    /// Floating point view of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null | Value::Blob(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(*r),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => serializer.serialize_bytes(b),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, bool);

/// Values beyond `i64::MAX` have no SQLite integer form. They are bound as
/// reals rather than wrapping to a negative integer.
impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Value::Real(v as f64), Value::Integer)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Builds a `Vec<Value>` parameter list from anything convertible into
/// [`Value`].
///
/// ```rust
/// use estate_core::{params, Value};
///
/// let p = params![1, "测试楼盘", None::<i64>];
/// assert_eq!(p[1], Value::Text("测试楼盘".to_string()));
/// assert!(p[2].is_null());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($param:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($param)),+]
    };
}

/// One result row: column names mapped to values, in select-list order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from parallel column and value vectors.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Looks up a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    /// Text value of a column; `None` for NULL or missing columns.
    pub fn get_string(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    /// Number of rows affected
    pub changes: u64,
    /// Identity generated by an insert, 0 when not applicable
    pub last_insert_rowid: i64,
}

impl ExecResult {
    /// Builds a write outcome. `inserted_rowid` is the identity the driver
    /// saw the statement generate; it is reported only when a row changed.
    pub fn normalized(changes: u64, inserted_rowid: Option<i64>) -> Self {
        Self {
            changes,
            last_insert_rowid: inserted_rowid.filter(|_| changes > 0).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_unsigned_ids_do_not_wrap() {
        assert_eq!(Value::from(42_u64), Value::Integer(42));
        assert_eq!(Value::from(i64::MAX as u64), Value::Integer(i64::MAX));

        let huge = Value::from(u64::MAX);
        assert!(matches!(huge, Value::Real(_)));
        assert_ne!(huge.as_i64(), Some(-1));
    }

    #[test]
    fn test_row_lookup_by_name() {
        let row = Row::new(
            vec!["id".into(), "name".into(), "remark".into()],
            vec![Value::Integer(3), Value::from("王先生"), Value::Null],
        );
        assert_eq!(row.get_i64("id"), Some(3));
        assert_eq!(row.get_string("name").as_deref(), Some("王先生"));
        assert_eq!(row.get_string("remark"), None);
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = Row::new(
            vec!["b".into(), "a".into()],
            vec![Value::Integer(1), Value::from("x")],
        );
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":1,"a":"x"}"#);
    }

    #[test]
    fn test_exec_result_normalization() {
        assert_eq!(ExecResult::normalized(1, Some(42)).last_insert_rowid, 42);
        assert_eq!(ExecResult::normalized(3, None).last_insert_rowid, 0);
        // INSERT OR IGNORE that skipped its row
        assert_eq!(ExecResult::normalized(0, Some(42)).last_insert_rowid, 0);
    }

    #[test]
    fn test_params_macro_conversions() {
        let p = params![1u64, 2.5, "a", Some("b"), None::<String>, true];
        assert_eq!(
            p,
            vec![
                Value::Integer(1),
                Value::Real(2.5),
                Value::Text("a".into()),
                Value::Text("b".into()),
                Value::Null,
                Value::Integer(1),
            ]
        );
        assert!(params![].is_empty());
    }
}
