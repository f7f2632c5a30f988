use serde::{Deserialize, Serialize};

use crate::representation::Representation;

/// Declared precision and scale of a decimal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalSize {
    pub precision: i64,
    pub scale: i64,
}

/// Declared type of one result column, as reported by a row source.
///
/// `None` in the optional hints means the driver does not know.
///
/// Examples:
/// - `{ name: "age", database_type_name: "INTEGER", scan_type: Int }`
/// - `{ name: "price", database_type_name: "DECIMAL", decimal_size: (10, 2) }`
/// - `{ name: "code", database_type_name: "VARCHAR", length: 16 }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Column name (or alias).
    pub name: String,
    /// Native type name, upper case by convention (`"VARCHAR"`, `"BIGINT"`).
    pub database_type_name: String,
    /// Representation the driver would pick on its own. Used when no
    /// mapper rule covers the column.
    pub scan_type: Representation,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub decimal_size: Option<DecimalSize>,
    #[serde(default)]
    pub length: Option<i64>,
}

impl TypeDescriptor {
    pub fn new(
        name: impl Into<String>,
        database_type_name: impl Into<String>,
        scan_type: Representation,
    ) -> Self {
        Self {
            name: name.into(),
            database_type_name: database_type_name.into(),
            scan_type,
            nullable: None,
            decimal_size: None,
            length: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_decimal_size(mut self, precision: i64, scale: i64) -> Self {
        self.decimal_size = Some(DecimalSize { precision, scale });
        self
    }

    pub fn with_length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }
}
