pub mod cell;
pub mod error;
pub mod representation;
pub mod schema;
pub mod source;
pub mod value;

pub use cell::{Cell, DriverValue};
pub use error::{ErrorKind, SourceError};
pub use representation::Representation;
pub use schema::{DecimalSize, TypeDescriptor};
pub use source::{RowSource, scan_values};
pub use value::Value;
