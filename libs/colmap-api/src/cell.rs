use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};

use crate::error::SourceError;
use crate::representation::Representation;
use crate::value::Value;

// ════════════════════════════════════════════════════════════════
//  DriverValue
// ════════════════════════════════════════════════════════════════

/// Raw value as produced by a driver, before coercion into a cell.
///
/// Intentionally small: drivers reduce their wire types to one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl DriverValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DriverValue::Null)
    }

    fn type_name(&self) -> &'static str {
        match self {
            DriverValue::Null => "null",
            DriverValue::Int(_) => "int",
            DriverValue::Float(_) => "float",
            DriverValue::Bool(_) => "bool",
            DriverValue::Bytes(_) => "bytes",
            DriverValue::Text(_) => "text",
            DriverValue::Timestamp(_) => "timestamp",
        }
    }

    /// Textual form of text-like values (`Text`, UTF-8 `Bytes`).
    fn text(&self) -> Option<Result<&str, SourceError>> {
        match self {
            DriverValue::Text(s) => Some(Ok(s)),
            DriverValue::Bytes(b) => Some(std::str::from_utf8(b).map_err(SourceError::from)),
            _ => None,
        }
    }
}

impl std::fmt::Display for DriverValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverValue::Null => f.write_str("NULL"),
            DriverValue::Int(v) => write!(f, "{v}"),
            DriverValue::Float(v) => write!(f, "{v}"),
            DriverValue::Bool(v) => write!(f, "{v}"),
            DriverValue::Bytes(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
            DriverValue::Text(s) => write!(f, "{s:?}"),
            DriverValue::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
        }
    }
}

impl From<&str> for DriverValue {
    fn from(s: &str) -> Self {
        DriverValue::Text(s.to_string())
    }
}

impl From<String> for DriverValue {
    fn from(s: String) -> Self {
        DriverValue::Text(s)
    }
}

impl From<i64> for DriverValue {
    fn from(v: i64) -> Self {
        DriverValue::Int(v)
    }
}

impl From<f64> for DriverValue {
    fn from(v: f64) -> Self {
        DriverValue::Float(v)
    }
}

impl From<bool> for DriverValue {
    fn from(v: bool) -> Self {
        DriverValue::Bool(v)
    }
}

// ════════════════════════════════════════════════════════════════
//  Cell
// ════════════════════════════════════════════════════════════════

/// Mutable storage for one column of the current row.
///
/// Allocated once per column from its `Representation` and overwritten in
/// place by `assign` on every row. The variant never changes after
/// allocation: assigning a value of another shape coerces or fails.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Duration(TimeDelta),
    /// `value = None` is SQL NULL. `inner` is kept so the cell can be
    /// re-allocated after a NULL.
    Nullable {
        inner: Representation,
        value: Option<Box<Cell>>,
    },
}

impl Cell {
    /// Zero value for a representation. Nullable cells start absent.
    pub fn zero(repr: &Representation) -> Self {
        match repr {
            Representation::Text => Cell::Text(String::new()),
            Representation::Bytes => Cell::Bytes(Vec::new()),
            Representation::Int => Cell::Int(0),
            Representation::Float => Cell::Float(0.0),
            Representation::Bool => Cell::Bool(false),
            Representation::Timestamp => Cell::Timestamp(DateTime::<Utc>::UNIX_EPOCH),
            Representation::Duration => Cell::Duration(TimeDelta::zero()),
            Representation::Nullable(inner) => Cell::Nullable {
                inner: (**inner).clone(),
                value: None,
            },
        }
    }

    pub fn representation(&self) -> Representation {
        match self {
            Cell::Text(_) => Representation::Text,
            Cell::Bytes(_) => Representation::Bytes,
            Cell::Int(_) => Representation::Int,
            Cell::Float(_) => Representation::Float,
            Cell::Bool(_) => Representation::Bool,
            Cell::Timestamp(_) => Representation::Timestamp,
            Cell::Duration(_) => Representation::Duration,
            Cell::Nullable { inner, .. } => Representation::nullable(inner.clone()),
        }
    }

    /// Owned copy of the stored value.
    ///
    /// Nullable layers are unwrapped until a concrete value is reached; an
    /// absent layer yields `Value::Null`.
    pub fn value(&self) -> Value {
        let mut current = self;
        loop {
            match current {
                Cell::Nullable { value: Some(inner), .. } => current = inner,
                Cell::Nullable { value: None, .. } => return Value::Null,
                Cell::Text(s) => return Value::Text(s.clone()),
                Cell::Bytes(b) => return Value::Bytes(b.clone()),
                Cell::Int(v) => return Value::Int(*v),
                Cell::Float(v) => return Value::Float(*v),
                Cell::Bool(v) => return Value::Bool(*v),
                Cell::Timestamp(v) => return Value::Timestamp(*v),
                Cell::Duration(v) => return Value::Duration(*v),
            }
        }
    }

    /// Coerce a driver value into this cell, overwriting it in place.
    ///
    /// On error the cell keeps its previous content.
    pub fn assign(&mut self, src: &DriverValue) -> Result<(), SourceError> {
        match self {
            Cell::Nullable { inner, value } => {
                if src.is_null() {
                    *value = None;
                    return Ok(());
                }
                match value {
                    Some(cell) => cell.assign(src),
                    None => {
                        let mut cell = Cell::zero(inner);
                        cell.assign(src)?;
                        *value = Some(Box::new(cell));
                        Ok(())
                    }
                }
            }
            _ if src.is_null() => Err(unsupported(src, &self.representation())
                .with_context("column is not nullable")),
            Cell::Text(slot) => {
                *slot = to_text(src)?;
                Ok(())
            }
            Cell::Bytes(slot) => {
                *slot = match src {
                    DriverValue::Bytes(b) => b.clone(),
                    other => to_text(other)?.into_bytes(),
                };
                Ok(())
            }
            Cell::Int(slot) => {
                *slot = to_int(src)?;
                Ok(())
            }
            Cell::Float(slot) => {
                *slot = to_float(src)?;
                Ok(())
            }
            Cell::Bool(slot) => {
                *slot = to_bool(src)?;
                Ok(())
            }
            Cell::Timestamp(slot) => {
                *slot = to_timestamp(src)?;
                Ok(())
            }
            Cell::Duration(slot) => {
                *slot = to_duration(src)?;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Coercions: one function per destination shape
// ---------------------------------------------------------------------------

fn unsupported(src: &DriverValue, target: &Representation) -> SourceError {
    SourceError::conversion(format!(
        "cannot convert {} value {src} into {target}",
        src.type_name()
    ))
}

fn invalid(src: &DriverValue, target: &Representation, cause: SourceError) -> SourceError {
    let base = unsupported(src, target);
    SourceError::conversion(format!("{}: {}", base.message(), cause.message()))
}

/// Floats use Rust's shortest round-trip form, never an exponent.
fn to_text(src: &DriverValue) -> Result<String, SourceError> {
    let text = match src {
        DriverValue::Text(s) => s.clone(),
        DriverValue::Bytes(b) => String::from_utf8(b.clone())
            .map_err(|e| invalid(src, &Representation::Text, e.into()))?,
        DriverValue::Int(v) => v.to_string(),
        DriverValue::Float(v) => v.to_string(),
        DriverValue::Bool(v) => v.to_string(),
        DriverValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        DriverValue::Null => String::new(),
    };
    Ok(text)
}

fn to_int(src: &DriverValue) -> Result<i64, SourceError> {
    let target = Representation::Int;
    match src {
        DriverValue::Int(v) => Ok(*v),
        // Integral floats only; anything else would silently truncate.
        DriverValue::Float(v) if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 => {
            Ok(*v as i64)
        }
        other => match other.text() {
            Some(text) => text
                .and_then(|s| s.parse::<i64>().map_err(SourceError::from))
                .map_err(|e| invalid(src, &target, e)),
            None => Err(unsupported(src, &target)),
        },
    }
}

fn to_float(src: &DriverValue) -> Result<f64, SourceError> {
    let target = Representation::Float;
    match src {
        DriverValue::Float(v) => Ok(*v),
        DriverValue::Int(v) => Ok(*v as f64),
        other => match other.text() {
            Some(text) => text
                .and_then(|s| s.parse::<f64>().map_err(SourceError::from))
                .map_err(|e| invalid(src, &target, e)),
            None => Err(unsupported(src, &target)),
        },
    }
}

fn to_bool(src: &DriverValue) -> Result<bool, SourceError> {
    let target = Representation::Bool;
    match src {
        DriverValue::Bool(v) => Ok(*v),
        DriverValue::Int(1) => Ok(true),
        DriverValue::Int(0) => Ok(false),
        other => match other.text() {
            Some(text) => text
                .and_then(|s| match s {
                    "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
                    "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
                    _ => Err(SourceError::conversion("invalid syntax")),
                })
                .map_err(|e| invalid(src, &target, e)),
            None => Err(unsupported(src, &target)),
        },
    }
}

fn to_timestamp(src: &DriverValue) -> Result<DateTime<Utc>, SourceError> {
    let target = Representation::Timestamp;
    match src {
        DriverValue::Timestamp(ts) => Ok(*ts),
        other => match other.text() {
            Some(text) => text
                .and_then(parse_timestamp)
                .map_err(|e| invalid(src, &target, e)),
            None => Err(unsupported(src, &target)),
        },
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` (UTC) and `YYYY-MM-DD`.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, SourceError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| SourceError::conversion(format!("no midnight for {date}")))
}

fn to_duration(src: &DriverValue) -> Result<TimeDelta, SourceError> {
    let target = Representation::Duration;
    match src {
        DriverValue::Int(v) => Ok(TimeDelta::nanoseconds(*v)),
        other => match other.text() {
            Some(text) => text
                .and_then(|s| s.parse::<i64>().map_err(SourceError::from))
                .map(TimeDelta::nanoseconds)
                .map_err(|e| invalid(src, &target, e)),
            None => Err(unsupported(src, &target)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn zero_values() {
        assert_eq!(Cell::zero(&Representation::Text).value(), Value::Text(String::new()));
        assert_eq!(Cell::zero(&Representation::Int).value(), Value::Int(0));
        assert_eq!(Cell::zero(&Representation::Bool).value(), Value::Bool(false));
        assert_eq!(
            Cell::zero(&Representation::nullable(Representation::Int)).value(),
            Value::Null
        );
    }

    #[test]
    fn text_into_int() {
        let mut cell = Cell::zero(&Representation::Int);
        cell.assign(&DriverValue::from("42")).unwrap();
        assert_eq!(cell.value(), Value::Int(42));

        let err = cell.assign(&DriverValue::from("forty")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        // Failed assignment leaves the previous value.
        assert_eq!(cell.value(), Value::Int(42));
    }

    #[test]
    fn float_into_int_requires_integral_value() {
        let mut cell = Cell::zero(&Representation::Int);
        cell.assign(&DriverValue::Float(7.0)).unwrap();
        assert_eq!(cell.value(), Value::Int(7));
        assert!(cell.assign(&DriverValue::Float(7.5)).is_err());
    }

    #[test]
    fn anything_into_text() {
        let mut cell = Cell::zero(&Representation::Text);
        cell.assign(&DriverValue::Int(35)).unwrap();
        assert_eq!(cell.value(), Value::from("35"));
        cell.assign(&DriverValue::Bytes(b"raw".to_vec())).unwrap();
        assert_eq!(cell.value(), Value::from("raw"));
    }

    #[test]
    fn invalid_utf8_into_text_fails() {
        let mut cell = Cell::zero(&Representation::Text);
        cell.assign(&DriverValue::from("kept")).unwrap();
        let err = cell.assign(&DriverValue::Bytes(vec![0x66, 0xff, 0x6f])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.message().contains("into text"));
        assert_eq!(cell.value(), Value::from("kept"));

        // Raw bytes cells take them unchanged.
        let mut raw = Cell::zero(&Representation::Bytes);
        raw.assign(&DriverValue::Bytes(vec![0x66, 0xff, 0x6f])).unwrap();
        assert_eq!(raw.value(), Value::Bytes(vec![0x66, 0xff, 0x6f]));
    }

    #[test]
    fn float_text_form() {
        let mut cell = Cell::zero(&Representation::Text);
        cell.assign(&DriverValue::Float(1e21)).unwrap();
        assert_eq!(cell.value(), Value::from("1000000000000000000000"));
        cell.assign(&DriverValue::Float(0.25)).unwrap();
        assert_eq!(cell.value(), Value::from("0.25"));
    }

    #[test]
    fn bool_syntax() {
        let mut cell = Cell::zero(&Representation::Bool);
        cell.assign(&DriverValue::from("t")).unwrap();
        assert_eq!(cell.value(), Value::Bool(true));
        cell.assign(&DriverValue::Int(0)).unwrap();
        assert_eq!(cell.value(), Value::Bool(false));
        assert!(cell.assign(&DriverValue::from("yes")).is_err());
    }

    #[test]
    fn timestamp_formats() {
        let mut cell = Cell::zero(&Representation::Timestamp);
        cell.assign(&DriverValue::from("2024-01-02 03:04:05")).unwrap();
        let a = cell.value();
        cell.assign(&DriverValue::from("2024-01-02T03:04:05Z")).unwrap();
        assert_eq!(cell.value(), a);
        cell.assign(&DriverValue::from("2024-01-02")).unwrap();
        assert_eq!(
            cell.value().to_json(),
            serde_json::json!("2024-01-02T00:00:00Z")
        );
    }

    #[test]
    fn duration_from_nanoseconds() {
        let mut cell = Cell::zero(&Representation::Duration);
        cell.assign(&DriverValue::Int(1_000_000_000)).unwrap();
        assert_eq!(cell.value(), Value::Duration(TimeDelta::seconds(1)));
    }

    #[test]
    fn null_handling() {
        let mut plain = Cell::zero(&Representation::Int);
        assert!(plain.assign(&DriverValue::Null).is_err());

        let mut nullable = Cell::zero(&Representation::nullable(Representation::Int));
        nullable.assign(&DriverValue::Int(5)).unwrap();
        assert_eq!(nullable.value(), Value::Int(5));
        nullable.assign(&DriverValue::Null).unwrap();
        assert_eq!(nullable.value(), Value::Null);
    }

    #[test]
    fn nested_nullable_unwraps_to_concrete_value() {
        let repr = Representation::nullable(Representation::nullable(Representation::Text));
        let mut cell = Cell::zero(&repr);
        assert_eq!(cell.representation(), repr);
        cell.assign(&DriverValue::from("deep")).unwrap();
        assert_eq!(cell.value(), Value::from("deep"));
    }

    #[test]
    fn failed_nullable_assign_stays_absent() {
        let mut cell = Cell::zero(&Representation::nullable(Representation::Int));
        assert!(cell.assign(&DriverValue::from("x")).is_err());
        assert_eq!(cell.value(), Value::Null);
    }
}
