mod parser;

use std::io::BufRead;

use colmap_api::{Cell, DriverValue, RowSource, SourceError, TypeDescriptor, scan_values};

use parser::{parse_column, parse_delimiter, split_record, trim_eol};

// ═══════════════════════════════════════════════════════════════
//  CsvSourceConfig
// ═══════════════════════════════════════════════════════════════

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_quoting() -> bool {
    true
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvSourceConfig {
    /// Single character; `"\\t"` is accepted for tab.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// RFC 4180 quoting. When off, fields are split on the delimiter only.
    #[serde(default = "default_quoting")]
    pub quoting: bool,
    /// Field content read as SQL NULL. Columns are declared nullable when set.
    #[serde(default)]
    pub null_token: Option<String>,
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            quoting: default_quoting(),
            null_token: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  CsvRows
// ═══════════════════════════════════════════════════════════════

/// Row source over delimited text with a typed header line.
///
/// The header names columns and optionally declares their SQL type:
/// `name:VARCHAR,age:INTEGER,joined:DATE`. Every value is handed to the
/// scanner as text and coerced into the cell the mapper picked, so a
/// non-numeric value in an `INTEGER` column fails the row.
///
/// Blank lines are skipped. A record with the wrong number of fields stops
/// iteration with a format error.
pub struct CsvRows<B> {
    reader: B,
    delimiter: char,
    quoting: bool,
    null_token: Option<String>,
    descriptors: Vec<TypeDescriptor>,
    current: Option<Vec<DriverValue>>,
    /// Lines consumed so far, header included.
    line: usize,
    buf: String,
    err: Option<SourceError>,
}

impl<B: BufRead> CsvRows<B> {
    /// Read the header and prepare for iteration.
    pub fn new(mut reader: B, config: &CsvSourceConfig) -> Result<Self, SourceError> {
        let delimiter = parse_delimiter(&config.delimiter)?;
        let nullable = config.null_token.is_some();

        let mut buf = String::new();
        let mut line = 0;
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Err(SourceError::metadata("CSV: missing header line"));
            }
            line += 1;
            if !trim_eol(&buf).is_empty() {
                break;
            }
        }

        let descriptors = split_record(trim_eol(&buf), delimiter, config.quoting)
            .iter()
            .map(|field| parse_column(field, nullable))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(columns = descriptors.len(), "csv header parsed");

        Ok(Self {
            reader,
            delimiter,
            quoting: config.quoting,
            null_token: config.null_token.clone(),
            descriptors,
            current: None,
            line,
            buf,
            err: None,
        })
    }

    /// Line number of the current record (1 based, header included).
    pub fn line(&self) -> usize {
        self.line
    }
}

fn to_driver_value(field: String, null_token: Option<&str>) -> DriverValue {
    if null_token == Some(field.as_str()) {
        DriverValue::Null
    } else {
        DriverValue::Text(field)
    }
}

impl<B: BufRead> RowSource for CsvRows<B> {
    fn column_types(&self) -> Result<Vec<TypeDescriptor>, SourceError> {
        Ok(self.descriptors.clone())
    }

    fn columns(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.descriptors.iter().map(|d| d.name.clone()).collect())
    }

    fn next(&mut self) -> bool {
        self.current = None;
        if self.err.is_some() {
            return false;
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return false,
                Ok(_) => self.line += 1,
                Err(e) => {
                    let e = SourceError::from(e).with_context(format!("line {}", self.line + 1));
                    tracing::warn!(error = %e, "csv read failed");
                    self.err = Some(e);
                    return false;
                }
            }

            let text = trim_eol(&self.buf);
            if text.is_empty() {
                continue;
            }

            let fields = split_record(text, self.delimiter, self.quoting);
            if fields.len() != self.descriptors.len() {
                let e = SourceError::format(format!(
                    "line {}: expected {} fields, got {}",
                    self.line,
                    self.descriptors.len(),
                    fields.len()
                ));
                tracing::warn!(error = %e, "malformed csv record");
                self.err = Some(e);
                return false;
            }

            let null_token = self.null_token.as_deref();
            let values: Vec<DriverValue> = fields
                .into_iter()
                .map(|f| to_driver_value(f, null_token))
                .collect();
            self.current = Some(values);
            return true;
        }
    }

    fn err(&self) -> Option<SourceError> {
        self.err.clone()
    }

    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), SourceError> {
        let values = self
            .current
            .as_ref()
            .ok_or_else(|| SourceError::logic("scan called without a current row"))?;
        scan_values(values, dest).map_err(|e| e.with_context(format!("line {}", self.line)))
    }
}

#[cfg(test)]
mod tests {
    use colmap_api::{ErrorKind, Representation, Value};

    use super::*;

    #[test]
    fn config_defaults() {
        let config: CsvSourceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.delimiter, ",");
        assert!(config.quoting);
        assert_eq!(config.null_token, None);

        let config: CsvSourceConfig =
            serde_json::from_str(r#"{"delimiter": ";", "null_token": "\\N"}"#).unwrap();
        assert_eq!(config.delimiter, ";");
        assert_eq!(config.null_token.as_deref(), Some("\\N"));
    }

    #[test]
    fn header_and_rows() {
        let data = "\nname:VARCHAR,age:INTEGER\njhon,35\n\njeremy,29\n";
        let mut rows = CsvRows::new(data.as_bytes(), &CsvSourceConfig::default()).unwrap();
        assert_eq!(rows.columns().unwrap(), ["name", "age"]);
        assert_eq!(rows.column_types().unwrap()[1].database_type_name, "INTEGER");

        let mut cells = vec![Cell::zero(&Representation::Text), Cell::zero(&Representation::Int)];
        assert!(rows.next());
        rows.scan(&mut cells).unwrap();
        assert_eq!(cells[1].value(), Value::Int(35));
        assert_eq!(rows.line(), 3);

        assert!(rows.next());
        rows.scan(&mut cells).unwrap();
        assert_eq!(cells[0].value(), Value::from("jeremy"));
        assert_eq!(rows.line(), 5);

        assert!(!rows.next());
        assert_eq!(rows.err(), None);
    }

    #[test]
    fn null_token() {
        let config = CsvSourceConfig {
            null_token: Some("NULL".into()),
            ..Default::default()
        };
        let mut rows = CsvRows::new("n:INTEGER\nNULL\n".as_bytes(), &config).unwrap();
        assert_eq!(rows.column_types().unwrap()[0].nullable, Some(true));

        let mut cells = vec![Cell::zero(&Representation::nullable(Representation::Int))];
        assert!(rows.next());
        rows.scan(&mut cells).unwrap();
        assert_eq!(cells[0].value(), Value::Null);
    }

    #[test]
    fn wrong_field_count_is_format_error() {
        let mut rows = CsvRows::new("a,b\n1,2\n3\n".as_bytes(), &CsvSourceConfig::default()).unwrap();
        assert!(rows.next());
        assert!(!rows.next());
        let err = rows.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.message().contains("line 3"));
        assert!(!rows.next());
    }

    #[test]
    fn missing_header() {
        let err = CsvRows::new("\n\n".as_bytes(), &CsvSourceConfig::default()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Metadata);
    }
}
