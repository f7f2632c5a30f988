use std::collections::HashMap;
use std::sync::Arc;

use colmap_api::{Representation, TypeDescriptor};

// ═══════════════════════════════════════════════════════════════
//  Matcher
// ═══════════════════════════════════════════════════════════════

type MatchFn = dyn Fn(&TypeDescriptor) -> Option<Representation> + Send + Sync;

/// A named rule that may override the name-based lookup for a column.
///
/// Returning `None` means the rule does not apply.
#[derive(Clone)]
pub struct Matcher {
    name: String,
    rule: Arc<MatchFn>,
}

impl Matcher {
    pub fn new<F>(name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> Option<Representation> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            rule: Arc::new(rule),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, col: &TypeDescriptor) -> Option<Representation> {
        (self.rule)(col)
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher").field("name", &self.name).finish()
    }
}

/// Match columns whose native type name equals `database_type_name` exactly.
pub fn database_type_as(database_type_name: impl Into<String>, repr: Representation) -> Matcher {
    let expected = database_type_name.into();
    Matcher::new(format!("database_type_as({expected})"), move |col| {
        (col.database_type_name == expected).then(|| repr.clone())
    })
}

/// Match columns whose name equals `column_name` exactly.
pub fn column_name_as(column_name: impl Into<String>, repr: Representation) -> Matcher {
    let expected = column_name.into();
    Matcher::new(format!("column_name_as({expected})"), move |col| {
        (col.name == expected).then(|| repr.clone())
    })
}

// ═══════════════════════════════════════════════════════════════
//  Default type table
// ═══════════════════════════════════════════════════════════════

// Predefined type names from the SQL:2011 foundation grammar.

const CHARACTER_TYPES: &[&str] = &[
    "CHARACTER",
    "CHAR",
    "CHARACTER VARYING",
    "CHAR VARYING",
    "VARCHAR",
    "TEXT",
    "CHARACTER LARGE OBJECT",
    "CHAR LARGE OBJECT",
    "CLOB",
    "NATIONAL CHARACTER",
    "NATIONAL CHAR",
    "NCHAR",
    "NATIONAL CHARACTER VARYING",
    "NATIONAL CHAR VARYING",
    "NCHAR VARYING",
    "NATIONAL CHARACTER LARGE OBJECT",
    "NCHAR LARGE OBJECT",
    "NCLOB",
];

const BINARY_TYPES: &[&str] = &[
    "BINARY",
    "BINARY VARYING",
    "VARBINARY",
    "BINARY LARGE OBJECT",
    "BLOB",
];

const INTEGER_TYPES: &[&str] = &["SMALLINT", "INTEGER", "INT", "BIGINT"];

/// Exact decimals are read as floats: no decimal representation exists.
const FLOAT_TYPES: &[&str] = &[
    "NUMERIC",
    "DECIMAL",
    "DEC",
    "FLOAT",
    "REAL",
    "DOUBLE PRECISION",
];

const BOOLEAN_TYPES: &[&str] = &["BOOLEAN"];

const DATETIME_TYPES: &[&str] = &[
    "DATE",
    "TIME",
    "TIME WITH TIME ZONE",
    "TIMESTAMP",
    "TIMESTAMP WITH TIME ZONE",
];

const INTERVAL_TYPES: &[&str] = &["INTERVAL"];

// ═══════════════════════════════════════════════════════════════
//  TypeMapper
// ═══════════════════════════════════════════════════════════════

/// Resolves a column's declared type to the representation to scan into.
///
/// Resolution order:
/// 1. matchers, in registration order, first match wins;
/// 2. the name table, keyed by native type name;
/// 3. the descriptor's own `scan_type`.
///
/// Resolution never fails. A mapper is cheap to clone and can be shared by
/// any number of scanners.
#[derive(Clone)]
pub struct TypeMapper {
    types: HashMap<String, Representation>,
    matchers: Vec<Matcher>,
}

impl std::fmt::Debug for TypeMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMapper")
            .field("types", &self.types.len())
            .field("matchers", &self.matchers)
            .finish()
    }
}

impl Default for TypeMapper {
    /// Mapper covering the standard SQL type names. No matchers.
    fn default() -> Self {
        let mut mapper = Self::empty();
        mapper.register(Representation::Text, CHARACTER_TYPES.iter().copied());
        mapper.register(Representation::Bytes, BINARY_TYPES.iter().copied());
        mapper.register(Representation::Int, INTEGER_TYPES.iter().copied());
        mapper.register(Representation::Float, FLOAT_TYPES.iter().copied());
        mapper.register(Representation::Bool, BOOLEAN_TYPES.iter().copied());
        mapper.register(Representation::Timestamp, DATETIME_TYPES.iter().copied());
        mapper.register(Representation::Duration, INTERVAL_TYPES.iter().copied());
        mapper
    }
}

impl TypeMapper {
    /// Mapper with no names and no matchers: every column gets its
    /// descriptor's `scan_type`.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            matchers: Vec::new(),
        }
    }

    pub fn resolve(&self, col: &TypeDescriptor) -> Representation {
        for matcher in &self.matchers {
            if let Some(repr) = matcher.apply(col) {
                tracing::trace!(column = %col.name, matcher = %matcher.name(), %repr, "matched");
                return repr;
            }
        }
        match self.types.get(&col.database_type_name) {
            Some(repr) => repr.clone(),
            None => {
                tracing::trace!(
                    column = %col.name,
                    database_type = %col.database_type_name,
                    repr = %col.scan_type,
                    "unknown type, using driver scan type"
                );
                col.scan_type.clone()
            }
        }
    }

    /// Map every name in `names` to `repr`, replacing earlier entries.
    pub fn register<I, S>(&mut self, repr: Representation, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.types.insert(name.into(), repr.clone());
        }
    }

    /// Append matchers after the existing ones. `None` entries are skipped.
    pub fn add_matchers<I>(&mut self, matchers: I)
    where
        I: IntoIterator<Item = Option<Matcher>>,
    {
        self.matchers.extend(matchers.into_iter().flatten());
    }

    pub fn add_matcher(&mut self, matcher: Matcher) {
        self.matchers.push(matcher);
    }

    /// Name-table entry for a native type name, ignoring matchers.
    pub fn lookup(&self, database_type_name: &str) -> Option<&Representation> {
        self.types.get(database_type_name)
    }

    pub fn matcher_count(&self) -> usize {
        self.matchers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, db_type: &str, fallback: Representation) -> TypeDescriptor {
        TypeDescriptor::new(name, db_type, fallback)
    }

    #[test]
    fn default_table() {
        let m = TypeMapper::default();
        assert_eq!(m.resolve(&col("a", "VARCHAR", Representation::Bytes)), Representation::Text);
        assert_eq!(m.resolve(&col("a", "BIGINT", Representation::Text)), Representation::Int);
        assert_eq!(m.resolve(&col("a", "REAL", Representation::Text)), Representation::Float);
        assert_eq!(m.resolve(&col("a", "BOOLEAN", Representation::Text)), Representation::Bool);
        assert_eq!(m.resolve(&col("a", "DATE", Representation::Text)), Representation::Timestamp);
        assert_eq!(m.resolve(&col("a", "INTERVAL", Representation::Text)), Representation::Duration);
        assert_eq!(m.resolve(&col("a", "BLOB", Representation::Text)), Representation::Bytes);
        assert_eq!(m.matcher_count(), 0);
    }

    #[test]
    fn unknown_type_falls_back_to_scan_type() {
        let m = TypeMapper::default();
        let fallback = Representation::nullable(Representation::Int);
        assert_eq!(m.resolve(&col("a", "MISSING TYPE", fallback.clone())), fallback);
        assert_eq!(TypeMapper::empty().resolve(&col("a", "VARCHAR", Representation::Bytes)), Representation::Bytes);
    }

    #[test]
    fn register_new_and_overwrite() {
        let mut m = TypeMapper::default();
        m.register(Representation::Bool, ["MY_BOOL", "FLAGTYPE"]);
        assert_eq!(m.lookup("MY_BOOL"), Some(&Representation::Bool));
        assert_eq!(m.lookup("FLAGTYPE"), Some(&Representation::Bool));

        m.register(Representation::Int, ["VARCHAR"]);
        m.register(Representation::Float, ["VARCHAR"]);
        assert_eq!(m.lookup("VARCHAR"), Some(&Representation::Float));
    }

    #[test]
    fn register_empty_is_noop() {
        let mut m = TypeMapper::empty();
        m.register(Representation::Int, Vec::<String>::new());
        assert_eq!(m.lookup("INT"), None);
    }

    #[test]
    fn matchers_override_table() {
        let mut m = TypeMapper::default();
        m.add_matcher(database_type_as("VARCHAR", Representation::Bytes));
        assert_eq!(m.resolve(&col("a", "VARCHAR", Representation::Text)), Representation::Bytes);
        assert_eq!(m.resolve(&col("a", "INT", Representation::Text)), Representation::Int);
    }

    #[test]
    fn first_registered_matcher_wins() {
        let mut m = TypeMapper::default();
        m.add_matchers([
            Some(column_name_as("id", Representation::Text)),
            Some(database_type_as("INTEGER", Representation::Float)),
        ]);
        let id = col("id", "INTEGER", Representation::Int);
        assert_eq!(m.resolve(&id), Representation::Text);

        let mut reversed = TypeMapper::default();
        reversed.add_matchers([
            Some(database_type_as("INTEGER", Representation::Float)),
            Some(column_name_as("id", Representation::Text)),
        ]);
        assert_eq!(reversed.resolve(&id), Representation::Float);
    }

    #[test]
    fn none_matchers_are_skipped() {
        let mut with_none = TypeMapper::default();
        with_none.add_matchers([None, Some(column_name_as("age", Representation::Text)), None]);

        let mut without = TypeMapper::default();
        without.add_matchers([Some(column_name_as("age", Representation::Text))]);

        assert_eq!(with_none.matcher_count(), without.matcher_count());
        let age = col("age", "INTEGER", Representation::Int);
        assert_eq!(with_none.resolve(&age), without.resolve(&age));
        let other = col("name", "INTEGER", Representation::Int);
        assert_eq!(with_none.resolve(&other), without.resolve(&other));
    }

    #[test]
    fn helpers_compare_exactly() {
        let by_type = database_type_as("INT", Representation::Text);
        assert_eq!(by_type.apply(&col("x", "INTEGER", Representation::Int)), None);
        assert_eq!(by_type.apply(&col("x", "int", Representation::Int)), None);
        assert_eq!(by_type.apply(&col("x", "INT", Representation::Int)), Some(Representation::Text));

        let by_name = column_name_as("id", Representation::Text);
        assert_eq!(by_name.apply(&col("ID", "INT", Representation::Int)), None);
        assert_eq!(by_name.name(), "column_name_as(id)");
    }
}
