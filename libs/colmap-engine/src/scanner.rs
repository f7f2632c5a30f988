use std::collections::HashMap;

use colmap_api::{Cell, Representation, RowSource, SourceError, Value};

use crate::error::ScanError;
use crate::mapper::TypeMapper;

/// One decoded row keyed by column name.
pub type Record = HashMap<String, Value>;

/// Options for `Scanner::new`.
pub struct ScannerOptions<'m, R> {
    /// Row source to read from. `None` fails construction with `NilSource`.
    pub rows: Option<R>,
    /// Type mapper; `TypeMapper::default()` when `None`.
    pub mapper: Option<&'m TypeMapper>,
}

impl<R> Default for ScannerOptions<'_, R> {
    fn default() -> Self {
        Self {
            rows: None,
            mapper: None,
        }
    }
}

impl<'m, R> ScannerOptions<'m, R> {
    pub fn new(rows: R) -> Self {
        Self {
            rows: Some(rows),
            mapper: None,
        }
    }

    pub fn with_mapper(mut self, mapper: &'m TypeMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }
}

/// Iteration state. `Exhausted` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Ready,
    Exhausted,
    Failed,
}

/// Reads rows from a `RowSource` into generic records.
///
/// Cells are allocated once at construction, one per column, and
/// overwritten in place by every `advance`. `materialize` copies values out,
/// so records stay valid after the next `advance`.
///
/// Single pass: once `advance` returns `false` it keeps returning `false`.
/// Whether that was the end of data or a failure is told by `last_error`.
pub struct Scanner<R> {
    rows: R,
    columns: Vec<String>,
    representations: Vec<Representation>,
    cells: Vec<Cell>,
    state: ScanState,
    err: Option<ScanError>,
}

impl<R> std::fmt::Debug for Scanner<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("columns", &self.columns)
            .field("representations", &self.representations)
            .field("state", &self.state)
            .field("err", &self.err)
            .finish()
    }
}

impl<R: RowSource> Scanner<R> {
    /// Build a scanner: read column metadata once, resolve each column
    /// through the mapper and allocate its cell.
    pub fn new(options: ScannerOptions<'_, R>) -> Result<Self, ScanError> {
        let rows = options.rows.ok_or(ScanError::NilSource)?;
        let default_mapper;
        let mapper = match options.mapper {
            Some(m) => m,
            None => {
                default_mapper = TypeMapper::default();
                &default_mapper
            }
        };

        let types = rows.column_types().map_err(ScanError::SourceMetadata)?;
        let columns = rows.columns().map_err(ScanError::SourceMetadata)?;
        if types.len() != columns.len() {
            return Err(ScanError::SourceMetadata(SourceError::metadata(format!(
                "{} column types for {} columns",
                types.len(),
                columns.len()
            ))));
        }

        let representations: Vec<Representation> = types.iter().map(|t| mapper.resolve(t)).collect();
        let cells = representations.iter().map(Cell::zero).collect();

        tracing::debug!(columns = columns.len(), "scanner ready");

        Ok(Self {
            rows,
            columns,
            representations,
            cells,
            state: ScanState::Ready,
            err: None,
        })
    }

    /// Move to the next row and decode it into the cells.
    ///
    /// Returns `false` when there is no more data or an error occurred;
    /// consult `last_error` to tell them apart. A row that fails to decode
    /// ends the iteration, it is not skipped.
    pub fn advance(&mut self) -> bool {
        if self.state != ScanState::Ready {
            return false;
        }
        if !self.rows.next() {
            match self.rows.err() {
                Some(e) => {
                    tracing::warn!(error = %e, "row source failed");
                    self.err = Some(ScanError::Source(e));
                    self.state = ScanState::Failed;
                }
                None => {
                    tracing::debug!("row source exhausted");
                    self.state = ScanState::Exhausted;
                }
            }
            return false;
        }
        if let Err(e) = self.rows.scan(&mut self.cells) {
            tracing::warn!(error = %e, "row decode failed");
            self.err = Some(ScanError::InvalidDataType(e));
            self.state = ScanState::Failed;
            return false;
        }
        true
    }
}

impl<R> Scanner<R> {
    /// Copy the current row into `record`.
    ///
    /// Keys matching a column are overwritten, other keys are left alone.
    /// Before the first `advance` every column holds its zero value.
    /// After a failed decode the cells may hold a mix of rows.
    pub fn materialize_into(&self, record: &mut Record) {
        for (name, cell) in self.columns.iter().zip(&self.cells) {
            record.insert(name.clone(), cell.value());
        }
    }

    /// Current row as a newly allocated record.
    pub fn materialize(&self) -> Record {
        let mut record = Record::with_capacity(self.columns.len());
        self.materialize_into(&mut record);
        record
    }

    /// Most recent error, if any. Never cleared.
    pub fn last_error(&self) -> Option<&ScanError> {
        self.err.as_ref()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Column names, in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Resolved representation per column, parallel to `columns`.
    pub fn representations(&self) -> &[Representation] {
        &self.representations
    }

    /// Give back the row source.
    pub fn into_source(self) -> R {
        self.rows
    }
}
