use colmap_api::{Cell, DriverValue, RowSource, SourceError, TypeDescriptor, scan_values};

// ═══════════════════════════════════════════════════════════════
//  MemoryRows
// ═══════════════════════════════════════════════════════════════

/// In-memory result set. Rows are held as driver values and decoded on
/// `scan`, so coercion behaves like a real driver.
///
/// Failures can be injected: metadata calls can be made to fail, and a row
/// index can be replaced by an error: `next` then stops at that row and
/// `err` reports it.
#[derive(Debug, Clone)]
pub struct MemoryRows {
    descriptors: Vec<TypeDescriptor>,
    rows: Vec<Vec<DriverValue>>,
    /// Index of the next row `next()` will move to.
    position: usize,
    current: Option<usize>,
    row_error: Option<(usize, SourceError)>,
    column_types_error: Option<SourceError>,
    columns_error: Option<SourceError>,
    err: Option<SourceError>,
}

impl MemoryRows {
    pub fn new(descriptors: Vec<TypeDescriptor>) -> Self {
        Self {
            descriptors,
            rows: Vec::new(),
            position: 0,
            current: None,
            row_error: None,
            column_types_error: None,
            columns_error: None,
            err: None,
        }
    }

    pub fn with_row(mut self, row: Vec<DriverValue>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_rows<I>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<DriverValue>>,
    {
        self.rows.extend(rows);
        self
    }

    /// Fail iteration when reaching row `index` (zero based). An index equal
    /// to the row count fails after the last row.
    pub fn with_row_error(mut self, index: usize, err: SourceError) -> Self {
        self.row_error = Some((index, err));
        self
    }

    pub fn fail_column_types(mut self, err: SourceError) -> Self {
        self.column_types_error = Some(err);
        self
    }

    pub fn fail_columns(mut self, err: SourceError) -> Self {
        self.columns_error = Some(err);
        self
    }

    /// Number of rows `next()` has moved past.
    pub fn rows_read(&self) -> usize {
        self.position
    }
}

impl RowSource for MemoryRows {
    fn column_types(&self) -> Result<Vec<TypeDescriptor>, SourceError> {
        match &self.column_types_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.descriptors.clone()),
        }
    }

    fn columns(&self) -> Result<Vec<String>, SourceError> {
        match &self.columns_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.descriptors.iter().map(|d| d.name.clone()).collect()),
        }
    }

    fn next(&mut self) -> bool {
        self.current = None;
        if self.err.is_some() {
            return false;
        }
        if let Some((index, e)) = &self.row_error {
            if *index == self.position {
                self.err = Some(e.clone());
                return false;
            }
        }
        if self.position >= self.rows.len() {
            return false;
        }
        self.current = Some(self.position);
        self.position += 1;
        true
    }

    fn err(&self) -> Option<SourceError> {
        self.err.clone()
    }

    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), SourceError> {
        let index = self
            .current
            .ok_or_else(|| SourceError::logic("scan called without a current row"))?;
        scan_values(&self.rows[index], dest).map_err(|e| e.with_context(format!("row {index}")))
    }
}
