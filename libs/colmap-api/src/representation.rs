use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Representation
// ════════════════════════════════════════════════════════════════

/// Concrete value shape allocated for a column before scanning.
///
/// Closed set: every representation has a zero value (`Cell::zero`) and a
/// decode rule for each driver value type (`Cell::assign`).
///
/// In TOML/JSON scalars are plain strings (`"int"`), nullable wrappers are
/// tables: `{ nullable = "int" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Text,
    Bytes,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    Bool,
    /// UTC instant.
    Timestamp,
    /// Signed span; driver integers are nanoseconds.
    Duration,
    /// Optional wrapper. NULL is stored as absence instead of failing.
    Nullable(Box<Representation>),
}

impl Representation {
    /// Shortcut: `Nullable(inner)`.
    pub fn nullable(inner: Representation) -> Self {
        Representation::Nullable(Box::new(inner))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Representation::Nullable(_))
    }

    /// Innermost non-nullable representation.
    pub fn base(&self) -> &Representation {
        let mut current = self;
        while let Representation::Nullable(inner) = current {
            current = inner;
        }
        current
    }
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Representation::Text => write!(f, "text"),
            Representation::Bytes => write!(f, "bytes"),
            Representation::Int => write!(f, "int"),
            Representation::Float => write!(f, "float"),
            Representation::Bool => write!(f, "bool"),
            Representation::Timestamp => write!(f, "timestamp"),
            Representation::Duration => write!(f, "duration"),
            Representation::Nullable(inner) => write!(f, "nullable<{inner}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_strips_every_nullable_layer() {
        let repr = Representation::nullable(Representation::nullable(Representation::Int));
        assert!(repr.is_nullable());
        assert_eq!(repr.base(), &Representation::Int);
        assert_eq!(repr.to_string(), "nullable<nullable<int>>");
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&Representation::nullable(Representation::Text)).unwrap();
        assert_eq!(json, r#"{"nullable":"text"}"#);

        let parsed: Representation = serde_json::from_str(r#""timestamp""#).unwrap();
        assert_eq!(parsed, Representation::Timestamp);
    }
}
