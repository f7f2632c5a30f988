use crate::cell::{Cell, DriverValue};
use crate::error::SourceError;
use crate::schema::TypeDescriptor;

/// Row source trait: the driver-level side of a query result.
///
/// The scanner doesn't know concrete drivers; for the scanner a result set
/// is just this trait. All methods block.
pub trait RowSource {
    /// Declared types of the result columns, in column order.
    fn column_types(&self) -> Result<Vec<TypeDescriptor>, SourceError>;

    /// Result column names, in column order.
    fn columns(&self) -> Result<Vec<String>, SourceError>;

    /// Move to the next row. `false` means no row: either exhausted or
    /// failed, told apart by `err()`.
    fn next(&mut self) -> bool;

    /// Pending error that stopped iteration, if any.
    fn err(&self) -> Option<SourceError>;

    /// Decode the current row into `dest`, one cell per column.
    /// Fails if any value cannot be coerced into its cell.
    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), SourceError>;
}

impl<R: RowSource + ?Sized> RowSource for &mut R {
    fn column_types(&self) -> Result<Vec<TypeDescriptor>, SourceError> {
        (**self).column_types()
    }

    fn columns(&self) -> Result<Vec<String>, SourceError> {
        (**self).columns()
    }

    fn next(&mut self) -> bool {
        (**self).next()
    }

    fn err(&self) -> Option<SourceError> {
        (**self).err()
    }

    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), SourceError> {
        (**self).scan(dest)
    }
}

impl<R: RowSource + ?Sized> RowSource for Box<R> {
    fn column_types(&self) -> Result<Vec<TypeDescriptor>, SourceError> {
        (**self).column_types()
    }

    fn columns(&self) -> Result<Vec<String>, SourceError> {
        (**self).columns()
    }

    fn next(&mut self) -> bool {
        (**self).next()
    }

    fn err(&self) -> Option<SourceError> {
        (**self).err()
    }

    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), SourceError> {
        (**self).scan(dest)
    }
}

/// Assign a row of driver values to destination cells, position by position.
///
/// Helper for `RowSource::scan` implementations. Stops at the first value
/// that cannot be coerced; earlier cells have already been overwritten.
pub fn scan_values(values: &[DriverValue], dest: &mut [Cell]) -> Result<(), SourceError> {
    if values.len() != dest.len() {
        return Err(SourceError::logic(format!(
            "expected {} destination cells, got {}",
            values.len(),
            dest.len()
        )));
    }
    for (i, (value, cell)) in values.iter().zip(dest.iter_mut()).enumerate() {
        cell.assign(value)
            .map_err(|e| e.with_context(format!("column {i}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::representation::Representation;
    use crate::value::Value;

    #[test]
    fn scan_values_checks_arity() {
        let mut cells = vec![Cell::zero(&Representation::Int)];
        let err = scan_values(&[DriverValue::Int(1), DriverValue::Int(2)], &mut cells).unwrap_err();
        assert!(err.message().contains("expected 2 destination cells"));
    }

    #[test]
    fn scan_values_reports_column() {
        let mut cells = vec![Cell::zero(&Representation::Text), Cell::zero(&Representation::Int)];
        let err = scan_values(&[DriverValue::from("a"), DriverValue::from("b")], &mut cells).unwrap_err();
        assert!(err.message().starts_with("column 1: "));
        assert_eq!(cells[0].value(), Value::from("a"));
    }
}
