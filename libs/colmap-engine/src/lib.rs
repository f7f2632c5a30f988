pub mod config;
pub mod error;
pub mod mapper;
pub mod scanner;

pub use config::MapperConfig;
pub use error::{ConfigError, ScanError};
pub use mapper::{Matcher, TypeMapper, column_name_as, database_type_as};
pub use scanner::{Record, ScanState, Scanner, ScannerOptions};
